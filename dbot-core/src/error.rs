//! Error types for the bot core.

use thiserror::Error;

/// Transport failure. Markup rejection is kept apart so callers can retry with other text.
#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Bot error: {0}")]
    Bot(String),

    /// The transport rejected the message markup (Telegram: "can't parse entities").
    #[error("Format error: {0}")]
    Format(String),
}

impl DbotError {
    /// True when the transport refused the markup rather than failing to deliver.
    pub fn is_format_error(&self) -> bool {
        matches!(self, DbotError::Format(_))
    }
}

/// Result type for core operations; uses [`DbotError`].
pub type Result<T> = std::result::Result<T, DbotError>;
