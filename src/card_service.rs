use crate::extraction::fields::FieldExtractor;
use crate::models::{OcrCardFields, QrCardFields};
use crate::processing::image_processor::ImageProcessor;
use crate::processing::ocr::{TesseractRecognizer, TextRecognizer};
use crate::processing::qr::{QrDecoder, QrLocator, QrScanner, RqrrDecoder, RqrrLocator};
use crate::utils::CardError;
use log::debug;

pub const DEFAULT_OCR_LANGUAGE: &str = "vie";

/// Entry points for the two extraction pipelines.
///
/// The pipelines share the image decode step but nothing else; callers pick
/// one per request. Everything is request-scoped: one recognizer invocation
/// per OCR request, one ladder traversal per QR request, no caching.
pub struct CardService<R = TesseractRecognizer, L = RqrrLocator, D = RqrrDecoder>
where
    R: TextRecognizer,
    L: QrLocator,
    D: QrDecoder,
{
    recognizer: R,
    scanner: QrScanner<L, D>,
    extractor: FieldExtractor,
    language: String,
}

impl CardService {
    pub fn new() -> Self {
        Self::with_components(TesseractRecognizer, QrScanner::new(RqrrLocator, RqrrDecoder))
    }
}

impl Default for CardService {
    fn default() -> Self {
        CardService::new()
    }
}

impl<R, L, D> CardService<R, L, D>
where
    R: TextRecognizer,
    L: QrLocator,
    D: QrDecoder,
{
    /// Assemble a service from explicit pipeline components. Tests inject
    /// stub recognizers and locators through this.
    pub fn with_components(recognizer: R, scanner: QrScanner<L, D>) -> Self {
        CardService {
            recognizer,
            scanner,
            extractor: FieldExtractor::new(),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// OCR pipeline: recognize the card face and extract the labelled
    /// fields. Any absent field fails the whole request with the list of
    /// missing names instead of returning partial data.
    pub fn read_card(&self, image_bytes: &[u8]) -> Result<OcrCardFields, CardError> {
        let image = ImageProcessor::decode(image_bytes)?;
        debug!("Decoded {}x{} card image", image.width(), image.height());

        let text = self.recognizer.recognize_text(&image, &self.language)?;
        let fields = self.extractor.extract(&text);

        let missing = fields.missing_fields();
        if !missing.is_empty() {
            return Err(CardError::MissingFields(missing.join(", ")));
        }
        Ok(fields)
    }

    /// QR pipeline: walk the resolution ladder until a payload decodes.
    /// Mapped fields are returned best-effort; there is no missing-field
    /// validation on this path.
    pub fn scan_qrcode(&self, image_bytes: &[u8]) -> Result<QrCardFields, CardError> {
        let image = ImageProcessor::decode(image_bytes)?;
        debug!("Decoded {}x{} card image", image.width(), image.height());

        self.scanner.scan(&image)
    }
}
