//! Application configuration. Generator credentials, context provider, server.

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_AI_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "mistral-small-latest";
pub const DEFAULT_CONTEXT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_USER_ID: u64 = 12;
/// Deadline for one plan request, after validation.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Text generation
    // ─────────────────────────────────────────────────────────────────────────
    /// Generator API key. Read from PLANNER_AI_API_KEY, falling back to MISTRAL_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Chat-completions endpoint. Read from PLANNER_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// Model name. Read from PLANNER_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Use the offline mock generator. Read from PLANNER_AI_MOCK.
    #[serde(default)]
    pub ai_mock: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // User context
    // ─────────────────────────────────────────────────────────────────────────
    /// Profile/activity provider root. Read from PLANNER_CONTEXT_API_URL.
    #[serde(default)]
    pub context_api_url: Option<String>,

    /// User whose context is fetched when the request names none. Read from PLANNER_DEFAULT_USER_ID.
    #[serde(default)]
    pub default_user_id: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Server
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// `json` for JSON log lines; anything else is plain text. Read from PLANNER_LOG_FORMAT.
    #[serde(default)]
    pub log_format: Option<String>,
}

impl AppConfig {
    /// Load PLANNER_* env vars, then the file named by PLANNER_CONFIG (if any).
    ///
    /// `.env` is not read here; the binary loads it first so it can log the outcome.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("PLANNER").try_parsing(true));
        if let Ok(path) = std::env::var("PLANNER_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the generator API key if configured. Empty values count as absent.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| std::env::var("MISTRAL_API_KEY").ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string())
    }

    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string())
    }

    pub fn use_mock_ai(&self) -> bool {
        self.ai_mock.unwrap_or(false)
    }

    pub fn context_api_url_or_default(&self) -> String {
        self.context_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTEXT_API_URL.to_string())
    }

    pub fn default_user_id_or_default(&self) -> u64 {
        self.default_user_id
            .filter(|id| *id > 0)
            .unwrap_or(DEFAULT_USER_ID)
    }

    /// Request deadline. Zero is treated as unset.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// `host:port`. Defaults to 0.0.0.0:8080.
    pub fn bind_addr(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or("0.0.0.0"),
            self.port.unwrap_or(8080)
        )
    }

    pub fn json_logs(&self) -> bool {
        self.log_format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ai_api_url_or_default(), DEFAULT_AI_API_URL);
        assert_eq!(cfg.ai_model_or_default(), "mistral-small-latest");
        assert_eq!(cfg.context_api_url_or_default(), "http://127.0.0.1:8000");
        assert_eq!(cfg.default_user_id_or_default(), 12);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert!(!cfg.use_mock_ai());
        assert!(!cfg.json_logs());
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig {
            ai_api_key: Some("  ".to_string()),
            request_timeout_secs: Some(0),
            default_user_id: Some(18),
            host: Some("127.0.0.1".to_string()),
            port: Some(3000),
            log_format: Some("JSON".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.ai_api_key(), None);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.default_user_id_or_default(), 18);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
        assert!(cfg.json_logs());
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        let cfg = AppConfig::load().unwrap();
        assert!(!cfg.ai_api_url_or_default().is_empty());
        assert!(cfg.request_timeout().as_secs() > 0);
    }
}
