//! # LLM client
//!
//! Defines the [`LlmBackend`] trait and an HTTP implementation for an OpenAI-chat-completions
//! compatible backend. Transport-agnostic; used by relay-bot's streaming pipeline.
//!
//! Neither `complete` nor `stream_completion` ever returns an error: failures become the
//! configured fallback phrase (non-streaming) or an empty fragment stream (streaming), and the
//! caller decides how to degrade.

use async_trait::async_trait;
use futures::stream::BoxStream;

mod config;
mod error;
mod http_client;
mod sse;
mod types;

pub use config::EnvLlmConfig;
pub use error::BackendError;
pub use http_client::{FallbackPhrase, HttpBackendClient};
pub use sse::{fragments_from_body, parse_payload, SseDecoder, SsePayload};
pub use types::{ChatMessage, MessageRole};

/// Lazily produced text fragments of one streamed completion.
pub type FragmentStream = BoxStream<'static, String>;

/// Language-model backend interface.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Non-streaming completion. Returns the reply text, an `Ошибка API: <status>` string on a
    /// non-200 status, or the fallback phrase on transport / payload failure.
    async fn complete(&self, messages: &[ChatMessage], conversation_key: &str) -> String;

    /// Streaming completion. The request is only sent when the stream is first polled.
    /// Non-200 status or transport failure yields an empty stream.
    fn stream_completion(&self, messages: &[ChatMessage], conversation_key: &str) -> FragmentStream;

    /// Asks the backend to drop its own history for `chat_id`.
    async fn clear_history(&self, chat_id: i64) -> Result<(), BackendError>;
}
