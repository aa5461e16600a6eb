//! Prescription endpoints.
//!
//! - `POST /api/prescriptions/generate`: draft with the LLM and persist
//! - `POST /api/prescriptions/validate`: allergy / duplicate checks
//! - `GET /api/prescriptions/:id`: fetch one stored prescription

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use super::parse_path_id;
use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::db::{get_prescription, DatabaseError};
use crate::models::{
    Prescription, PrescriptionRequest, PrescriptionValidationRequest, ValidationResponse,
};
use crate::validation::validate_request;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub message: &'static str,
    pub prescription_id: Uuid,
}

pub async fn generate(
    State(ctx): State<ApiContext>,
    Json(request): Json<PrescriptionRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    tracing::info!(patient_id = %request.patient_id, "Prescription generation requested");

    let pipeline = ctx.pipeline.clone();
    let saved = run_blocking(move || Ok(pipeline.generate_and_save(&request)?)).await?;

    Ok(Json(GenerateResponse {
        message: "Prescription generated and saved successfully.",
        prescription_id: saved.id,
    }))
}

/// Always 200: internal faults come back as a `VALIDATION_ERROR` issue.
pub async fn validate(
    Json(request): Json<PrescriptionValidationRequest>,
) -> Json<ValidationResponse> {
    Json(ValidationResponse {
        validation_issues: validate_request(&request),
    })
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Prescription>, ApiError> {
    let id = parse_path_id(&id)?;
    let db = ctx.db.clone();
    let prescription = run_blocking(move || {
        db.with_conn(|conn| get_prescription(conn, &id))?
            .ok_or_else(|| DatabaseError::not_found("Prescription", &id).into())
    })
    .await?;
    Ok(Json(prescription))
}
