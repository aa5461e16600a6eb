//! Visit endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::parse_path_id;
use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::db::{create_visit, get_visit, DatabaseError};
use crate::models::{NewVisit, Visit};

/// `POST /visits`: patient and clinician must already exist.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewVisit>,
) -> Result<(StatusCode, Json<Visit>), ApiError> {
    let db = ctx.db.clone();
    let visit = run_blocking(move || Ok(db.with_conn(|conn| create_visit(conn, new))?)).await?;
    tracing::info!(visit_id = %visit.id, patient_id = %visit.patient_id, "Visit recorded");
    Ok((StatusCode::CREATED, Json(visit)))
}

/// `GET /visits/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Visit>, ApiError> {
    let id = parse_path_id(&id)?;
    let db = ctx.db.clone();
    let visit = run_blocking(move || {
        db.with_conn(|conn| get_visit(conn, &id))?
            .ok_or_else(|| DatabaseError::not_found("Visit", &id).into())
    })
    .await?;
    Ok(Json(visit))
}
