//! `POST /ocr`: text extraction from a base64-encoded image.
//!
//! Failures answer with a plain-text body rather than the JSON error shape.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::types::ApiContext;
use crate::pipeline::extraction::{ExtractionError, MISSING_IMAGE_MESSAGE};

const INTERNAL_FAILURE: &str = "Failed to process image due to an internal error.";
const UPSTREAM_FAILURE: &str = "Failed to process image due to an OCR service error.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    pub base64_image: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    pub extracted_text: String,
}

pub async fn extract(
    State(ctx): State<ApiContext>,
    Json(request): Json<OcrRequest>,
) -> Result<Json<OcrResponse>, (StatusCode, String)> {
    let image = match request.base64_image {
        Some(image) if !image.trim().is_empty() => image,
        _ => {
            tracing::warn!("OCR request without image data");
            return Err((StatusCode::BAD_REQUEST, MISSING_IMAGE_MESSAGE.to_string()));
        }
    };
    tracing::info!(payload_chars = image.len(), "OCR request received");

    let adapter = ctx.ocr.clone();
    let result = tokio::task::spawn_blocking(move || adapter.extract_text(&image)).await;

    match result {
        Ok(Ok(text)) => {
            tracing::info!(chars = text.len(), "OCR completed");
            Ok(Json(OcrResponse { extracted_text: text }))
        }
        Ok(Err(ExtractionError::Input(detail))) => {
            tracing::warn!(detail, "OCR input rejected");
            Err((StatusCode::BAD_REQUEST, detail))
        }
        Ok(Err(e @ ExtractionError::Upstream(_))) => {
            tracing::error!(error = %e, "OCR service failed");
            Err((StatusCode::BAD_GATEWAY, UPSTREAM_FAILURE.to_string()))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "OCR processing failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_FAILURE.to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "OCR task failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_FAILURE.to_string()))
        }
    }
}
