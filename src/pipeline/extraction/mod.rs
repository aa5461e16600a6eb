pub mod adapter;
pub mod cloud_vision;
pub mod ocr;
pub mod types;

pub use adapter::*;
pub use cloud_vision::*;
pub use ocr::*;
pub use types::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The caller sent something that is not a usable image payload.
    #[error("Invalid image input: {0}")]
    Input(String),

    /// A remote OCR service failed or answered with an error.
    #[error("OCR service error: {0}")]
    Upstream(String),

    /// The local engine failed to initialise or to process the image.
    #[error("OCR processing failed: {0}")]
    Engine(String),

    #[error("Tessdata not found at: {0}")]
    TessdataNotFound(PathBuf),
}
