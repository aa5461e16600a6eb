//! Clinician endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::parse_path_id;
use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::db::{create_clinician, get_clinician, DatabaseError};
use crate::models::{Clinician, NewClinician};

/// `POST /clinicians`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewClinician>,
) -> Result<(StatusCode, Json<Clinician>), ApiError> {
    let db = ctx.db.clone();
    let clinician =
        run_blocking(move || Ok(db.with_conn(|conn| create_clinician(conn, new))?)).await?;
    tracing::info!(clinician_id = %clinician.id, "Clinician created");
    Ok((StatusCode::CREATED, Json(clinician)))
}

/// `GET /clinicians/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Clinician>, ApiError> {
    let id = parse_path_id(&id)?;
    let db = ctx.db.clone();
    let clinician = run_blocking(move || {
        db.with_conn(|conn| get_clinician(conn, &id))?
            .ok_or_else(|| DatabaseError::not_found("Clinician", &id).into())
    })
    .await?;
    Ok(Json(clinician))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::api::endpoints::test_support::*;
    use crate::api::router::api_router;
    use crate::pipeline::prescribing::MockLlmGateway;

    #[tokio::test]
    async fn create_then_fetch() {
        let app = api_router(context(Arc::new(MockLlmGateway::new("{}"))));
        let response = app
            .clone()
            .oneshot(json_request("POST", "/clinicians", json!({"username": "dr_grey"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap();

        let response = app
            .oneshot(empty_request("GET", &format!("/clinicians/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["username"], "dr_grey");
    }
}
