//! # relay_bot
//!
//! Telegram front-end for an OpenAI-compatible backend: streams each reply into one editable
//! message, hides `<think>` sections, throttles edits and renders MarkdownV2.
//!
//! - [`pipeline::StreamingPipeline`]: the per-request flow.
//! - [`session::SessionRegistry`]: history, admission and throttle state shared by all requests.
//! - [`handlers`]: media / command / relay handlers for the chain.
//! - [`run_bot`]: wires everything to Telegram.

mod assembly;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod phrases;
pub mod pipeline;
pub mod session;

pub use assembly::{build_handler_chain, run_bot};
pub use cli::{load_config, Cli, Commands};
pub use config::{BotConfig, RelaySettings};
pub use phrases::PhraseBook;
pub use pipeline::{PipelineError, PipelineOutcome, StreamingPipeline};
pub use session::SessionRegistry;
