use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use zeroize::Zeroizing;

/// Application-level constants
pub const APP_NAME: &str = "HealthAI";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder some deployments leave in `.env` files instead of a real key.
pub const MISSING_KEY_SENTINEL: &str = "NOT_FOUND";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_VISION_BASE_URL: &str = "https://vision.googleapis.com/v1";

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "healthai=info,healthai_lib=info,tower_http=info".to_string()
}

/// Get the application data directory
/// (`~/.local/share/healthai` on Linux, platform equivalent elsewhere).
/// Falls back to the working directory when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("healthai")
}

/// Default SQLite database location.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("healthai.db")
}

/// Which engine turns image bytes into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OcrBackendKind {
    /// No engine: the adapter answers with a fixed development string.
    Disabled,
    /// Local Tesseract (requires the `ocr` cargo feature).
    Tesseract,
    /// Google Cloud Vision TEXT_DETECTION.
    CloudVision,
}

/// API credential held in memory that is wiped on drop and never printed.
#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    /// Returns `None` for blank values and the `NOT_FOUND` placeholder.
    pub fn from_raw(raw: Option<String>) -> Option<Self> {
        let raw = raw?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == MISSING_KEY_SENTINEL {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_string())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Command-line flags, each with an environment-variable fallback.
#[derive(Parser, Debug)]
#[command(name = "healthai")]
#[command(about = "Clinical assistant backend: prescription drafting, validation and OCR")]
pub struct Args {
    /// Server bind address
    #[arg(long, env = "HEALTHAI_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "HEALTHAI_PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "HEALTHAI_DATABASE")]
    pub database: Option<PathBuf>,

    /// Gemini API key used for prescription drafting
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// LLM request timeout in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 30)]
    pub llm_timeout_secs: u64,

    /// OCR engine
    #[arg(long, env = "OCR_BACKEND", value_enum, default_value_t = OcrBackendKind::Disabled)]
    pub ocr_backend: OcrBackendKind,

    /// Tesseract traineddata directory
    #[arg(long, env = "TESSDATA_PREFIX", default_value = "/usr/share/tesseract-ocr/5/tessdata")]
    pub tessdata_dir: PathBuf,

    /// Tesseract language(s), e.g. "eng" or "eng+fra"
    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    pub ocr_language: String,

    /// Google Cloud Vision API key
    #[arg(long, env = "GOOGLE_VISION_API_KEY", hide_env_values = true)]
    pub vision_api_key: Option<String>,

    /// Google Cloud Vision base URL
    #[arg(long, env = "GOOGLE_VISION_BASE_URL", default_value = DEFAULT_VISION_BASE_URL)]
    pub vision_base_url: String,
}

/// LLM gateway settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// OCR backend settings.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub backend: OcrBackendKind,
    pub tessdata_dir: PathBuf,
    pub language: String,
    pub vision_api_key: Option<ApiKey>,
    pub vision_base_url: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::Disabled,
            tessdata_dir: PathBuf::from("/usr/share/tesseract-ocr/5/tessdata"),
            language: "eng".to_string(),
            vision_api_key: None,
            vision_base_url: DEFAULT_VISION_BASE_URL.to_string(),
        }
    }
}

/// Everything the server needs at startup, passed explicitly to constructors.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            database_path: args.database.unwrap_or_else(default_database_path),
            llm: LlmConfig {
                api_key: ApiKey::from_raw(args.gemini_api_key),
                base_url: args.gemini_base_url,
                model: args.gemini_model,
                timeout_secs: args.llm_timeout_secs,
            },
            ocr: OcrConfig {
                backend: args.ocr_backend,
                tessdata_dir: args.tessdata_dir,
                language: args.ocr_language,
                vision_api_key: ApiKey::from_raw(args.vision_api_key),
                vision_base_url: args.vision_base_url,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_under_app_data() {
        let db = default_database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("healthai.db"));
    }

    #[test]
    fn api_key_rejects_blank_and_sentinel() {
        assert!(ApiKey::from_raw(None).is_none());
        assert!(ApiKey::from_raw(Some(String::new())).is_none());
        assert!(ApiKey::from_raw(Some("   ".into())).is_none());
        assert!(ApiKey::from_raw(Some("NOT_FOUND".into())).is_none());
        assert_eq!(ApiKey::from_raw(Some(" abc ".into())).unwrap().expose(), "abc");
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::from_raw(Some("super-secret".into())).unwrap();
        let printed = format!("{key:?}");
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["healthai"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.llm_timeout_secs, 30);
        assert_eq!(args.gemini_model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn args_select_ocr_backend() {
        let args = Args::try_parse_from(["healthai", "--ocr-backend", "cloud-vision"]).unwrap();
        assert_eq!(args.ocr_backend, OcrBackendKind::CloudVision);
    }

    #[test]
    fn config_from_args_filters_missing_key() {
        let args = Args::try_parse_from([
            "healthai",
            "--gemini-api-key",
            "NOT_FOUND",
            "--database",
            "/tmp/x.db",
        ])
        .unwrap();
        let config = AppConfig::from(args);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn app_name_is_healthai() {
        assert_eq!(APP_NAME, "HealthAI");
    }
}
