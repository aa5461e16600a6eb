use std::sync::Arc;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use super::cloud_vision::CloudVisionClient;
use super::ocr::DisabledOcr;
use super::types::OcrEngine;
use super::ExtractionError;
use crate::config::{OcrBackendKind, OcrConfig};

pub const MISSING_IMAGE_MESSAGE: &str = "Missing or empty 'base64Image' field in request.";

/// Standard alphabet, `=` padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Entry point for OCR requests: decodes the payload and hands the bytes to
/// whichever engine was configured at startup.
pub struct OcrAdapter {
    engine: Arc<dyn OcrEngine>,
}

impl OcrAdapter {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    /// Pick the engine named by `config`. A backend that cannot be set up
    /// degrades to [`DisabledOcr`] with a warning instead of failing startup.
    pub fn from_config(config: &OcrConfig) -> Self {
        let engine: Arc<dyn OcrEngine> = match config.backend {
            OcrBackendKind::Disabled => Arc::new(DisabledOcr),
            OcrBackendKind::Tesseract => tesseract_engine(config),
            OcrBackendKind::CloudVision => match config.vision_api_key.clone() {
                Some(key) => match CloudVisionClient::new(&config.vision_base_url, key) {
                    Ok(client) => Arc::new(client),
                    Err(e) => {
                        tracing::warn!(error = %e, "Cloud Vision client unavailable, OCR disabled");
                        Arc::new(DisabledOcr)
                    }
                },
                None => {
                    tracing::warn!("Cloud Vision selected without an API key, OCR disabled");
                    Arc::new(DisabledOcr)
                }
            },
        };
        tracing::info!(backend = engine.name(), "OCR backend ready");
        Self { engine }
    }

    pub fn backend_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Decode `base64_image` (optionally a data URI) and run OCR on it.
    pub fn extract_text(&self, base64_image: &str) -> Result<String, ExtractionError> {
        let bytes = decode_base64_image(base64_image)?;
        tracing::debug!(bytes = bytes.len(), backend = self.engine.name(), "Running OCR");
        self.engine.recognize(&bytes)
    }
}

/// Strip everything up to and including the first comma (the
/// `data:image/png;base64,` prefix, when present) and decode the rest.
pub fn decode_base64_image(input: &str) -> Result<Vec<u8>, ExtractionError> {
    if input.trim().is_empty() {
        return Err(ExtractionError::Input(MISSING_IMAGE_MESSAGE.into()));
    }

    let payload = match input.split_once(',') {
        Some((_, rest)) => rest,
        None => input,
    }
    .trim();

    if payload.is_empty() {
        return Err(ExtractionError::Input("Image payload is empty".into()));
    }

    LENIENT_BASE64
        .decode(payload)
        .map_err(|e| ExtractionError::Input(format!("Invalid Base64 image data: {e}")))
}

#[cfg(feature = "ocr")]
fn tesseract_engine(config: &OcrConfig) -> Arc<dyn OcrEngine> {
    match super::ocr::BundledTesseract::new(&config.tessdata_dir, &config.language) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::warn!(error = %e, "Tesseract unavailable, OCR disabled");
            Arc::new(DisabledOcr)
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn tesseract_engine(_config: &OcrConfig) -> Arc<dyn OcrEngine> {
    tracing::warn!("Built without the `ocr` feature, Tesseract unavailable, OCR disabled");
    Arc::new(DisabledOcr)
}
