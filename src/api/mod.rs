//! HTTP API.
//!
//! `api_router()` returns a composable `Router` exposing the OCR, LLM,
//! prescription and record endpoints. Blocking work (SQLite, outbound HTTP
//! through the blocking clients) runs on tokio's blocking pool.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
