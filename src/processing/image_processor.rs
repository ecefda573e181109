use std::io::Cursor;
use crate::utils::CardError;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

/// Contrast enhancement settings for the QR crop. Tile-local equalization
/// with a clip limit keeps glare from washing out the module grid.
pub const CLAHE_CLIP_LIMIT: f32 = 2.0;
pub const CLAHE_TILE_GRID: u32 = 30;

/// ImageProcessor handles decoding and the pixel-level transforms shared by
/// both pipelines. Every operation returns a new buffer; the decoded
/// original is never modified.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode an uploaded byte stream (JPEG, PNG, ...) into a pixel buffer.
    /// A stream that does not decode is a client error, not a fault.
    pub fn decode(image_bytes: &[u8]) -> Result<DynamicImage, CardError> {
        image::load_from_memory(image_bytes)
            .map_err(|e| CardError::InvalidImage(format!("{}", e)))
    }

    /// Re-encode a pixel buffer as PNG for engines that consume files.
    pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CardError> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| CardError::ImageProcessing(format!("Failed to encode image: {}", e)))?;
        Ok(buffer.into_inner())
    }

    /// Resize to the given width, preserving aspect ratio, with linear
    /// interpolation.
    pub fn resize_to_width(image: &DynamicImage, new_width: u32) -> DynamicImage {
        let ratio = new_width as f32 / image.width() as f32;
        let new_height = ((image.height() as f32 * ratio) as u32).max(1);
        image.resize_exact(new_width, new_height, FilterType::Triangle)
    }

    /// Crop a rectangular region out of the image.
    pub fn crop_region(
        image: &DynamicImage,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> DynamicImage {
        image.crop_imm(x, y, width, height)
    }

    /// Tile-based histogram equalization with a clip limit (CLAHE).
    ///
    /// The image is divided into a `grid` x `grid` tile layout. Each tile
    /// gets its own clipped, mass-preserving histogram mapping; output
    /// pixels blend the four surrounding tile mappings bilinearly so tile
    /// seams do not show up in the enhanced crop.
    pub fn clahe(gray: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return gray.clone();
        }

        // Never use more tiles than pixels per axis.
        let tiles_x = grid.clamp(1, width) as usize;
        let tiles_y = grid.clamp(1, height) as usize;
        let tile_w = (width as usize + tiles_x - 1) / tiles_x;
        let tile_h = (height as usize + tiles_y - 1) / tiles_y;
        // Re-derive the counts from the tile size so no tile is empty.
        let tiles_x = (width as usize + tile_w - 1) / tile_w;
        let tiles_y = (height as usize + tile_h - 1) / tile_h;

        let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let x0 = tx * tile_w;
                let y0 = ty * tile_h;
                let x1 = ((tx + 1) * tile_w).min(width as usize);
                let y1 = ((ty + 1) * tile_h).min(height as usize);

                let mut hist = [0u32; 256];
                for y in y0..y1 {
                    for x in x0..x1 {
                        hist[gray.get_pixel(x as u32, y as u32).0[0] as usize] += 1;
                    }
                }
                let count = ((x1 - x0) * (y1 - y0)) as u32;

                // Clip each bin and hand the excess back so total mass is
                // unchanged; the remainder tops up the lowest bins.
                let limit = ((clip_limit * count as f32 / 256.0) as u32).max(1);
                let mut excess = 0u32;
                for bin in hist.iter_mut() {
                    if *bin > limit {
                        excess += *bin - limit;
                        *bin = limit;
                    }
                }
                let bonus = excess / 256;
                let remainder = (excess % 256) as usize;
                for (i, bin) in hist.iter_mut().enumerate() {
                    *bin += bonus;
                    if i < remainder {
                        *bin += 1;
                    }
                }

                let scale = 255.0 / count.max(1) as f32;
                let lut = &mut luts[ty * tiles_x + tx];
                let mut cdf = 0u32;
                for (value, bin) in hist.iter().enumerate() {
                    cdf += bin;
                    lut[value] = (cdf as f32 * scale).round().min(255.0) as u8;
                }
            }
        }

        let mut out = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let value = gray.get_pixel(x, y).0[0] as usize;

                // Position relative to tile centers, for bilinear blending.
                let fx = (x as f32 + 0.5) / tile_w as f32 - 0.5;
                let fy = (y as f32 + 0.5) / tile_h as f32 - 0.5;
                let bx = fx.floor();
                let by = fy.floor();
                let wx = fx - bx;
                let wy = fy - by;

                let tx0 = (bx.max(0.0) as usize).min(tiles_x - 1);
                let tx1 = ((bx + 1.0).max(0.0) as usize).min(tiles_x - 1);
                let ty0 = (by.max(0.0) as usize).min(tiles_y - 1);
                let ty1 = ((by + 1.0).max(0.0) as usize).min(tiles_y - 1);

                let top = luts[ty0 * tiles_x + tx0][value] as f32 * (1.0 - wx)
                    + luts[ty0 * tiles_x + tx1][value] as f32 * wx;
                let bottom = luts[ty1 * tiles_x + tx0][value] as f32 * (1.0 - wx)
                    + luts[ty1 * tiles_x + tx1][value] as f32 * wx;
                let blended = (top * (1.0 - wy) + bottom * wy).round().min(255.0) as u8;
                out.put_pixel(x, y, Luma([blended]));
            }
        }
        out
    }
}
