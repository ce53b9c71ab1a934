//! Backend configuration loaded from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_PATH: &str = "/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "menon-1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 100;

#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub base_url: String,
    pub chat_path: String,
    pub model: String,
    /// Applies to non-streaming and clear-history requests; streaming has no overall timeout.
    pub request_timeout: Duration,
}

impl Default for EnvLlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EnvLlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("BACKEND_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let chat_path =
            env::var("BACKEND_CHAT_PATH").unwrap_or_else(|_| DEFAULT_CHAT_PATH.to_string());
        let model = env::var("BACKEND_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = match env::var("BACKEND_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("BACKEND_TIMEOUT_SECS is not a number: {raw}"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url,
            chat_path,
            model,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn chat_url(&self) -> String {
        if self.chat_path.starts_with('/') {
            format!("{}{}", self.base(), self.chat_path)
        } else {
            format!("{}/{}", self.base(), self.chat_path)
        }
    }

    pub fn clear_history_url(&self) -> String {
        format!("{}/clear_history", self.base())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "BACKEND_BASE_URL",
            "BACKEND_CHAT_PATH",
            "BACKEND_MODEL",
            "BACKEND_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = EnvLlmConfig::from_env().unwrap();
        assert_eq!(config.chat_url(), "http://localhost:8000/v1/chat/completions");
        assert_eq!(config.clear_history_url(), "http://localhost:8000/clear_history");
        assert_eq!(config.model, "menon-1");
        assert_eq!(config.request_timeout, Duration::from_secs(100));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides_and_trailing_slash() {
        clear_env();
        env::set_var("BACKEND_BASE_URL", "http://backend:9000/");
        env::set_var("BACKEND_CHAT_PATH", "chat");
        env::set_var("BACKEND_TIMEOUT_SECS", "5");
        let config = EnvLlmConfig::from_env().unwrap();
        assert_eq!(config.chat_url(), "http://backend:9000/chat");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_timeout() {
        clear_env();
        env::set_var("BACKEND_TIMEOUT_SECS", "soon");
        assert!(EnvLlmConfig::from_env().is_err());
        clear_env();
    }
}
