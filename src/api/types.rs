//! Shared state for the API layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::db::Database;
use crate::pipeline::extraction::OcrAdapter;
use crate::pipeline::prescribing::PrescriptionPipeline;

/// Shared context for all API routes. Cheap to clone.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Database>,
    pub pipeline: Arc<PrescriptionPipeline>,
    pub ocr: Arc<OcrAdapter>,
}

impl ApiContext {
    pub fn new(db: Arc<Database>, pipeline: Arc<PrescriptionPipeline>, ocr: Arc<OcrAdapter>) -> Self {
        Self { db, pipeline, ocr }
    }
}

/// Run blocking work (SQLite, blocking HTTP clients) off the async executor.
pub async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
