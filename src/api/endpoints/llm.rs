//! `POST /llm/completion`: free-form prompt passthrough to the LLM.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};

#[derive(Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize)]
pub struct CompletionResponse {
    pub response: String,
}

pub async fn completion(
    State(ctx): State<ApiContext>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".into()));
    }

    let pipeline = ctx.pipeline.clone();
    let response = run_blocking(move || Ok(pipeline.complete(&request.prompt)?)).await?;
    Ok(Json(CompletionResponse { response }))
}
