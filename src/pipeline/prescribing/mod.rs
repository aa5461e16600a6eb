pub mod gemini;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use gemini::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

use crate::db::DatabaseError;

/// Failures talking to the completion endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot reach LLM endpoint at {0}")]
    Connection(String),

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM returned error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Outcome categories of a generation run. Callers only ever see a generic
/// message for these; the detail goes to the log.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Upstream LLM failure: {0}")]
    Upstream(#[from] LlmError),

    #[error("Storage failure: {0}")]
    Storage(#[from] DatabaseError),
}
