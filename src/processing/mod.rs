pub mod image_processor;
pub mod ocr;
pub mod qr;

pub use image_processor::ImageProcessor;
pub use ocr::{TesseractRecognizer, TextRecognizer};
pub use qr::{QrDecoder, QrLocator, QrScanner, RqrrDecoder, RqrrLocator};
