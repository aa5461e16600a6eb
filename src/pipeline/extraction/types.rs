use super::ExtractionError;

/// Fixed text returned when no OCR backend is available.
pub const DISABLED_OCR_TEXT: &str = "Mock OCR result: OCR backend is disabled.";

/// Image-to-text engine abstraction.
pub trait OcrEngine: Send + Sync {
    /// Recognise text in an encoded image (PNG, JPEG, TIFF...).
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}
