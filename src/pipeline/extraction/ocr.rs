use super::types::{OcrEngine, DISABLED_OCR_TEXT};
use super::ExtractionError;

/// Local Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct BundledTesseract {
    tessdata_dir: std::path::PathBuf,
    language: String,
}

#[cfg(feature = "ocr")]
impl BundledTesseract {
    /// Every language in `language` (e.g. "eng+fra") needs a traineddata
    /// file in `tessdata_dir`.
    pub fn new(tessdata_dir: &std::path::Path, language: &str) -> Result<Self, ExtractionError> {
        for lang in language.split('+') {
            if !tessdata_dir.join(format!("{lang}.traineddata")).exists() {
                return Err(ExtractionError::TessdataNotFound(tessdata_dir.to_path_buf()));
            }
        }
        tracing::info!(
            tessdata = %tessdata_dir.display(),
            language,
            "Tesseract OCR initialised"
        );
        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            language: language.to_string(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for BundledTesseract {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let tessdata_str = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::Engine("Invalid tessdata path".into()))?;

        let tess = tesseract::Tesseract::new(Some(tessdata_str), Some(self.language.as_str()))
            .map_err(|e| ExtractionError::Engine(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::Engine(format!("{e:?}")))?;

        let text = tess
            .get_text()
            .map_err(|e| ExtractionError::Engine(format!("{e:?}")))?;

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

/// Stand-in used when OCR is switched off or the requested backend cannot
/// be set up. Always answers with [`DISABLED_OCR_TEXT`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOcr;

impl OcrEngine for DisabledOcr {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        tracing::debug!(bytes = image_bytes.len(), "OCR disabled, returning placeholder text");
        Ok(DISABLED_OCR_TEXT.to_string())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    result: Result<String, String>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
        }
    }

    /// Fail every call with an engine error.
    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        self.result.clone().map_err(ExtractionError::Engine)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
