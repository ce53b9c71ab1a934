//! # dbot-telegram
//!
//! Telegram bot framework layer: adapters, [`dbot_core::Bot`] implementation, minimal config, REPL runner.
//! Handles only Telegram connectivity and handler-chain execution; no history, backend or formatting logic.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{message_kind, TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{is_message_not_modified_error, TelegramBotAdapter};
pub use config::TelegramConfig;
pub use runner::run_repl;
