use thiserror::Error;

/// Errors produced by the card reading pipelines.
///
/// Client-data errors carry the exact message the caller should surface;
/// everything else is an internal fault.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Image processing error: {0}")]
    ImageProcessing(String),
    #[error("OCR error: {0}")]
    Ocr(String),
    #[error("Please upload a photo with QRcode")]
    QrNotFound,
    #[error("The following fields in the card have null values: {0}")]
    MissingFields(String),
    #[error("Unrecognized QR payload: expected 6 or 7 fields, got {0}")]
    UnrecognizedPayload(usize),
    #[error("IO error: {0}")]
    IoError(String),
}

impl CardError {
    /// Whether the failure is caused by the submitted card photo rather
    /// than by the service itself. The web layer maps these to 400.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CardError::InvalidImage(_)
                | CardError::QrNotFound
                | CardError::MissingFields(_)
                | CardError::UnrecognizedPayload(_)
        )
    }
}
