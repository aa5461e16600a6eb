//! Patient endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::parse_path_id;
use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::db::{create_patient, delete_patient, get_patient, get_prescriptions_for_patient, DatabaseError};
use crate::models::{NewPatient, Patient, Prescription};

/// `POST /patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let db = ctx.db.clone();
    let patient = run_blocking(move || Ok(db.with_conn(|conn| create_patient(conn, new))?)).await?;
    tracing::info!(patient_id = %patient.id, "Patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `GET /patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let id = parse_path_id(&id)?;
    let db = ctx.db.clone();
    let patient = run_blocking(move || {
        db.with_conn(|conn| get_patient(conn, &id))?
            .ok_or_else(|| DatabaseError::not_found("Patient", &id).into())
    })
    .await?;
    Ok(Json(patient))
}

/// `DELETE /patients/:id`: removes the patient's prescriptions and visits too.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id(&id)?;
    let db = ctx.db.clone();
    let removed = run_blocking(move || Ok(db.with_transaction(|tx| delete_patient(tx, &id))?)).await?;
    if !removed {
        return Err(DatabaseError::not_found("Patient", &id).into());
    }
    tracing::info!(patient_id = %id, "Patient deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /patients/:id/prescriptions`: newest first.
pub async fn prescriptions(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Prescription>>, ApiError> {
    let id = parse_path_id(&id)?;
    let db = ctx.db.clone();
    let list = run_blocking(move || {
        db.with_conn(|conn| {
            if get_patient(conn, &id)?.is_none() {
                return Err(DatabaseError::not_found("Patient", &id));
            }
            get_prescriptions_for_patient(conn, &id)
        })
        .map_err(ApiError::from)
    })
    .await?;
    Ok(Json(list))
}
