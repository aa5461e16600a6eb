//! API endpoint handlers, one module per resource.

pub mod clinicians;
pub mod health;
pub mod llm;
pub mod ocr;
pub mod patients;
pub mod prescriptions;
pub mod visits;

use uuid::Uuid;

use crate::api::error::ApiError;

/// Path identifiers are taken as strings so a malformed id gets our JSON
/// error body instead of the extractor's plain-text rejection.
pub(crate) fn parse_path_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid id: {raw}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response};

    use crate::api::types::ApiContext;
    use crate::config::ApiKey;
    use crate::db::Database;
    use crate::pipeline::extraction::{DisabledOcr, OcrAdapter, OcrEngine};
    use crate::pipeline::prescribing::{LabelledFieldParser, LlmGateway, PrescriptionPipeline};

    /// Context over an in-memory database with the given gateway and OCR engine.
    pub fn context_with(
        gateway: Arc<dyn LlmGateway>,
        api_key: Option<&str>,
        ocr: Arc<dyn OcrEngine>,
    ) -> ApiContext {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let pipeline = PrescriptionPipeline::new(
            gateway,
            Arc::new(LabelledFieldParser),
            db.clone(),
            ApiKey::from_raw(api_key.map(str::to_string)),
        );
        ApiContext::new(db, Arc::new(pipeline), Arc::new(OcrAdapter::new(ocr)))
    }

    pub fn context(gateway: Arc<dyn LlmGateway>) -> ApiContext {
        context_with(gateway, Some("test-key"), Arc::new(DisabledOcr))
    }

    pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
