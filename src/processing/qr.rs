use crate::extraction::qr_payload::extract_qr_info;
use crate::models::QrCardFields;
use crate::processing::image_processor::{ImageProcessor, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID};
use crate::utils::CardError;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold};
use log::{debug, info};

/// Candidate widths for QR localization, widest first. Large cards decode
/// best when upscaled enough that the module grid survives enhancement.
pub const QR_SCAN_WIDTHS: [u32; 3] = [6500, 4500, 3200];

/// Axis-aligned bounding rectangle of a located QR polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Bounding rectangle of a polygon, clamped to the image bounds.
    /// Returns `None` for a degenerate (zero-area) region.
    pub fn from_polygon(points: &[(i32, i32)], image_width: u32, image_height: u32) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let min_x = points.iter().map(|p| p.0).min()?.clamp(0, image_width as i32) as u32;
        let max_x = points.iter().map(|p| p.0).max()?.clamp(0, image_width as i32) as u32;
        let min_y = points.iter().map(|p| p.1).min()?.clamp(0, image_height as i32) as u32;
        let max_y = points.iter().map(|p| p.1).max()?.clamp(0, image_height as i32) as u32;

        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// QR localization boundary: find the code's corner polygon, if any.
pub trait QrLocator {
    fn locate(&self, image: &DynamicImage) -> Option<Vec<(i32, i32)>>;
}

/// QR payload boundary: decode a cropped, enhanced region to its payload
/// string. Empty string means undecodable.
pub trait QrDecoder {
    fn decode_payload(&self, region: &GrayImage) -> String;
}

pub struct RqrrLocator;

impl QrLocator for RqrrLocator {
    fn locate(&self, image: &DynamicImage) -> Option<Vec<(i32, i32)>> {
        let gray = image.to_luma8();
        let width = gray.width() as usize;
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, gray.height() as usize, |x, y| {
                gray.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();
        grids
            .first()
            .map(|grid| grid.bounds.iter().map(|p| (p.x as i32, p.y as i32)).collect())
    }
}

pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode_payload(&self, region: &GrayImage) -> String {
        if let Some(content) = decode_grayscale(region) {
            return content;
        }
        // Otsu binarization rescues crops the direct pass cannot separate
        let level = otsu_level(region);
        let binary = threshold(region, level);
        decode_grayscale(&binary).unwrap_or_default()
    }
}

fn decode_grayscale(gray: &GrayImage) -> Option<String> {
    let width = gray.width() as usize;
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, gray.height() as usize, |x, y| {
            gray.get_pixel(x as u32, y as u32).0[0]
        });
    let grids = prepared.detect_grids();
    grids
        .first()
        .and_then(|grid| grid.decode().ok())
        .map(|(_, content)| content)
}

/// Retry controller for the QR pipeline. Walks the width ladder, resizing,
/// locating, enhancing and decoding at each step, and stops at the first
/// non-empty payload.
pub struct QrScanner<L, D> {
    locator: L,
    decoder: D,
    widths: Vec<u32>,
}

impl<L: QrLocator, D: QrDecoder> QrScanner<L, D> {
    pub fn new(locator: L, decoder: D) -> Self {
        Self::with_widths(locator, decoder, QR_SCAN_WIDTHS.to_vec())
    }

    pub fn with_widths(locator: L, decoder: D, widths: Vec<u32>) -> Self {
        QrScanner {
            locator,
            decoder,
            widths,
        }
    }

    pub fn scan(&self, image: &DynamicImage) -> Result<QrCardFields, CardError> {
        // TODO: confirm whether the final ladder width should ever be
        // attempted; the scan loop has always stopped one short of it.
        for &width in &self.widths[..self.widths.len().saturating_sub(1)] {
            let resized = ImageProcessor::resize_to_width(image, width);

            let Some(polygon) = self.locator.locate(&resized) else {
                debug!("No QR bounding box at width {}", width);
                continue;
            };
            let Some(bbox) =
                BoundingBox::from_polygon(&polygon, resized.width(), resized.height())
            else {
                debug!("Degenerate QR bounding box at width {}", width);
                continue;
            };

            let region =
                ImageProcessor::crop_region(&resized, bbox.x, bbox.y, bbox.width, bbox.height)
                    .to_luma8();
            let enhanced = ImageProcessor::clahe(&region, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID);

            let payload = self.decoder.decode_payload(&enhanced);
            if let Some(fields) = extract_qr_info(&payload)? {
                info!("QR payload decoded at width {}", width);
                return Ok(fields);
            }
            debug!("Undecodable QR region at width {}", width);
        }

        Err(CardError::QrNotFound)
    }
}
