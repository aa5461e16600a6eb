//! Google Cloud Vision OCR backend.
//!
//! One `images:annotate` call per image with a single TEXT_DETECTION
//! feature. An `error` object (top-level or per-image) or an empty
//! `responses` list is an upstream failure; an image without text yields an
//! empty string.

use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::types::OcrEngine;
use super::ExtractionError;
use crate::config::ApiKey;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct CloudVisionClient {
    base_url: String,
    api_key: ApiKey,
    client: reqwest::blocking::Client,
}

impl CloudVisionClient {
    pub fn new(base_url: &str, api_key: ApiKey) -> Result<Self, ExtractionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ExtractionError::Engine(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/images:annotate", self.base_url)
    }
}

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: [AnnotateImageRequest<'a>; 1],
}

#[derive(Serialize)]
struct AnnotateImageRequest<'a> {
    image: ImageContent,
    features: [Feature<'a>; 1],
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
    error: Option<Status>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<TextAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl OcrEngine for CloudVisionClient {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let body = AnnotateRequest {
            requests: [AnnotateImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image_bytes),
                },
                features: [Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose())])
            .json(&body)
            .send()
            .map_err(|e| ExtractionError::Upstream(e.without_url().to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .map_err(|e| ExtractionError::Upstream(e.without_url().to_string()))?;

        // Error responses still carry a JSON `error` object worth surfacing.
        let parsed: AnnotateResponse = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ExtractionError::Upstream(format!("HTTP {}", status.as_u16())));
            }
            Err(e) => {
                return Err(ExtractionError::Upstream(format!("Unreadable response: {e}")));
            }
        };

        let text = text_from_response(parsed)?;
        if !status.is_success() {
            return Err(ExtractionError::Upstream(format!("HTTP {}", status.as_u16())));
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "cloud-vision"
    }
}

fn text_from_response(response: AnnotateResponse) -> Result<String, ExtractionError> {
    if let Some(err) = response.error {
        return Err(ExtractionError::Upstream(format!("{} (code {})", err.message, err.code)));
    }
    let Some(first) = response.responses.into_iter().next() else {
        return Err(ExtractionError::Upstream("Empty responses list".into()));
    };
    if let Some(err) = first.error {
        return Err(ExtractionError::Upstream(format!("{} (code {})", err.message, err.code)));
    }

    let text = match first.full_text_annotation {
        Some(annotation) => annotation.text,
        None => first
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .unwrap_or_default(),
    };
    if text.is_empty() {
        tracing::info!("Cloud Vision found no text in image");
    }
    Ok(text.trim().to_string())
}
