use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;

use super::types::LlmGateway;
use super::LlmError;
use crate::config::{ApiKey, LlmConfig};

/// Connection establishment gets its own, shorter budget.
const CONNECT_TIMEOUT_SECS: u64 = 20;

/// Gemini `generateContent` client.
pub struct GeminiClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs)))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Self::new(&config.base_url, &config.model, config.timeout_secs)
    }

    /// Endpoint without the key, safe to log.
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl LlmGateway for GeminiClient {
    fn complete(&self, prompt: &str, api_key: &ApiKey) -> Result<String, LlmError> {
        let endpoint = self.endpoint();
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        tracing::debug!(endpoint = %endpoint, prompt_chars = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", api_key.expose())])
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else {
                    // The URL carries the key.
                    LlmError::HttpClient(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| LlmError::HttpClient(e.without_url().to_string()))?;

        if status != StatusCode::OK {
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

/// Mock gateway for testing: returns a configured body or error and records
/// every prompt it receives.
pub struct MockLlmGateway {
    response: Result<String, (u16, String)>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlmGateway {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Answer every call with an upstream error of the given status.
    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            response: Err((status, body.to_string())),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Wrap `text` in a minimal Gemini response envelope.
    pub fn with_text(text: &str) -> Self {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        });
        Self::new(&body.to_string())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl LlmGateway for MockLlmGateway {
    fn complete(&self, prompt: &str, _api_key: &ApiKey) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err((status, body)) => Err(LlmError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
