//! BotConfig: TelegramConfig + EnvLlmConfig + RelaySettings, loaded from env.

use anyhow::{bail, Context, Result};
use dbot_telegram::TelegramConfig;
use llm_client::EnvLlmConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOG_FILE: &str = "logs/relay-bot.log";

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Turns sent per request; storage keeps twice as many.
    pub max_history_messages: usize,
    pub min_edit_interval: Duration,
    pub typing_interval: Duration,
    pub phrase_rotation_interval: Duration,
    /// Chats remembered by the edit throttle.
    pub rate_window_capacity: usize,
    pub phrases_path: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            max_history_messages: 12,
            min_edit_interval: Duration::from_millis(800),
            typing_interval: Duration::from_secs(4),
            phrase_rotation_interval: Duration::from_secs(3),
            rate_window_capacity: 10_000,
            phrases_path: "phrases.json".to_string(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key}={raw}: {e}")),
        Err(_) => Ok(default),
    }
}

impl RelaySettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_history_messages: env_or("MAX_HISTORY_MESSAGES", defaults.max_history_messages)?,
            min_edit_interval: Duration::from_millis(env_or(
                "MIN_EDIT_INTERVAL_MS",
                defaults.min_edit_interval.as_millis() as u64,
            )?),
            typing_interval: Duration::from_secs(env_or(
                "TYPING_INTERVAL_SECS",
                defaults.typing_interval.as_secs(),
            )?),
            phrase_rotation_interval: Duration::from_secs(env_or(
                "PHRASE_ROTATION_SECS",
                defaults.phrase_rotation_interval.as_secs(),
            )?),
            rate_window_capacity: env_or("RATE_WINDOW_CAPACITY", defaults.rate_window_capacity)?,
            phrases_path: env::var("PHRASES_PATH").unwrap_or(defaults.phrases_path),
        })
    }
}

/// Full application config. Use [`BotConfig::load`], then [`BotConfig::validate`].
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub llm: EnvLlmConfig,
    pub relay: RelaySettings,
}

impl BotConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let telegram = TelegramConfig::load(token)?;
        let llm = EnvLlmConfig::from_env().context("backend config")?;
        let relay = RelaySettings::from_env().context("relay settings")?;
        Ok(Self {
            telegram,
            llm,
            relay,
        })
    }

    /// Fail fast before any network I/O.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if reqwest::Url::parse(&self.llm.chat_url()).is_err() {
            bail!("BACKEND_BASE_URL is not a valid URL: {}", self.llm.base_url);
        }
        if self.relay.max_history_messages == 0 {
            bail!("MAX_HISTORY_MESSAGES must be at least 1");
        }
        Ok(())
    }

    pub fn log_file(&self) -> &str {
        self.telegram.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE)
    }
}
