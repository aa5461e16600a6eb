//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Layer stack (outermost → innermost):
//! 1. Request tracing → 2. CORS → 3. `Cache-Control: no-store` → handler

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Base64 images inflate by a third; phone photos fit comfortably.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Build the API router.
///
/// Handlers use `State<ApiContext>`; `.with_state()` turns the
/// `Router<ApiContext>` into a plain `Router` before the layers go on.
pub fn api_router(ctx: ApiContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/ocr", post(endpoints::ocr::extract))
        .route("/llm/completion", post(endpoints::llm::completion))
        .route(
            "/api/prescriptions/generate",
            post(endpoints::prescriptions::generate),
        )
        .route(
            "/api/prescriptions/validate",
            post(endpoints::prescriptions::validate),
        )
        .route("/api/prescriptions/:id", get(endpoints::prescriptions::detail))
        .route("/patients", post(endpoints::patients::create))
        .route(
            "/patients/:id",
            get(endpoints::patients::detail).delete(endpoints::patients::remove),
        )
        .route(
            "/patients/:id/prescriptions",
            get(endpoints::patients::prescriptions),
        )
        .route("/clinicians", post(endpoints::clinicians::create))
        .route("/clinicians/:id", get(endpoints::clinicians::detail))
        .route("/visits", post(endpoints::visits::create))
        .route("/visits/:id", get(endpoints::visits::detail))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
}
