use std::io::Write;
use crate::processing::image_processor::ImageProcessor;
use crate::utils::CardError;
use image::DynamicImage;
use log::debug;
use tempfile::NamedTempFile;
use tesseract::Tesseract;

/// Text recognition boundary. The pipelines only rely on this contract:
/// one call per request, returning the recognized regions newline-joined
/// in detection order.
pub trait TextRecognizer {
    fn recognize_text(&self, image: &DynamicImage, language: &str) -> Result<String, CardError>;
}

/// Production recognizer backed by a Tesseract instance created per call.
pub struct TesseractRecognizer;

impl TextRecognizer for TesseractRecognizer {
    fn recognize_text(&self, image: &DynamicImage, language: &str) -> Result<String, CardError> {
        // Tesseract reads from a path, so stage the pixels in a temp file
        let png = ImageProcessor::encode_png(image)?;
        let mut temp_file = NamedTempFile::new()
            .map_err(|e| CardError::Ocr(format!("Failed to create temp file: {}", e)))?;

        temp_file
            .write_all(&png)
            .map_err(|e| CardError::Ocr(format!("Failed to write to temp file: {}", e)))?;

        let image_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| CardError::Ocr("Failed to convert path to string".to_string()))?;

        let text = Tesseract::new(None, Some(language))
            .map_err(|e| CardError::Ocr(format!("Tesseract init error: {}", e)))?
            .set_image(image_path)
            .map_err(|e| CardError::Ocr(format!("Tesseract set image error: {}", e)))?
            .get_text()
            .map_err(|e| CardError::Ocr(format!("Tesseract error: {}", e)))?;

        debug!("Recognized {} characters of card text", text.len());
        Ok(text)
    }
}
