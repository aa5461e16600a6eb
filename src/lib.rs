pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::{AppConfig, Args};
use crate::db::{Database, DatabaseError};
use crate::pipeline::extraction::OcrAdapter;
use crate::pipeline::prescribing::{
    GeminiClient, LabelledFieldParser, LlmError, PrescriptionPipeline,
};

/// Failures that stop the server before it accepts a request.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database unavailable: {0}")]
    Database(#[from] DatabaseError),
    #[error("LLM client setup failed: {0}")]
    Llm(#[from] LlmError),
    #[error("Invalid bind address {0}")]
    BindAddress(String),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire the database, LLM pipeline and OCR adapter from `config`.
///
/// Builds blocking HTTP clients, so call it outside any tokio runtime.
pub fn build_context(config: &AppConfig) -> Result<ApiContext, StartupError> {
    let db = Arc::new(Database::open(&config.database_path)?);
    tracing::info!(path = %config.database_path.display(), "Database ready");

    let gateway = GeminiClient::from_config(&config.llm)?;
    let pipeline = PrescriptionPipeline::new(
        Arc::new(gateway),
        Arc::new(LabelledFieldParser),
        db.clone(),
        config.llm.api_key.clone(),
    );
    tracing::info!(
        model = %config.llm.model,
        timeout_secs = config.llm.timeout_secs,
        "Prescription pipeline ready"
    );

    let ocr = OcrAdapter::from_config(&config.ocr);

    Ok(ApiContext::new(db, Arc::new(pipeline), Arc::new(ocr)))
}

fn bind_address(config: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| StartupError::BindAddress(format!("{}:{}", config.host, config.port)))
}

/// Server entry point: configuration, logging, then serve until Ctrl-C.
pub fn run() -> Result<(), StartupError> {
    // A missing .env file is normal.
    dotenvy::dotenv().ok();
    let app_config = AppConfig::from(Args::parse());

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let addr = bind_address(&app_config)?;
    // Held here so the blocking HTTP clients are dropped after the runtime.
    let ctx = build_context(&app_config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let served = runtime.block_on(async {
        let mut server = api::start_api_server(ctx.clone(), addr).await?;
        tracing::info!(addr = %server.addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {e}");
        }
        server.shutdown();
        server.wait().await;
        Ok::<_, StartupError>(())
    });

    drop(runtime);
    drop(ctx);
    tracing::info!("{} stopped", config::APP_NAME);
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, OcrConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

    fn config(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: dir.join("nested").join("healthai.db"),
            llm: LlmConfig {
                api_key: None,
                base_url: DEFAULT_GEMINI_BASE_URL.into(),
                model: DEFAULT_GEMINI_MODEL.into(),
                timeout_secs: 30,
            },
            ocr: OcrConfig::default(),
        }
    }

    #[test]
    fn context_builds_without_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = build_context(&config(dir.path())).unwrap();
        assert!(!ctx.pipeline.is_configured());
        assert_eq!(ctx.ocr.backend_name(), "disabled");
        assert!(dir.path().join("nested").join("healthai.db").exists());
    }

    #[test]
    fn bind_address_parses_host_and_port() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.port = 8080;
        assert_eq!(bind_address(&cfg).unwrap().to_string(), "127.0.0.1:8080");

        cfg.host = "not a host".into();
        assert!(matches!(bind_address(&cfg), Err(StartupError::BindAddress(_))));
    }
}
