//! reqwest implementation of [`LlmBackend`].

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::EnvLlmConfig;
use crate::error::BackendError;
use crate::sse::fragments_from_body;
use crate::types::ChatMessage;
use crate::{FragmentStream, LlmBackend};

/// Supplies the phrase returned when a non-streaming request cannot produce an answer.
pub type FallbackPhrase = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct ClearHistoryRequest {
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI-chat-completions compatible backend over HTTP.
#[derive(Clone)]
pub struct HttpBackendClient {
    client: Client,
    config: EnvLlmConfig,
    fallback: FallbackPhrase,
}

impl HttpBackendClient {
    pub fn new(config: EnvLlmConfig, fallback: FallbackPhrase) -> Result<Self, BackendError> {
        // No client-wide timeout: streamed responses may legitimately run long.
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            config,
            fallback,
        })
    }

    pub fn config(&self) -> &EnvLlmConfig {
        &self.config
    }

    fn fallback_phrase(&self) -> String {
        (self.fallback)()
    }

    /// Extracts `choices[0].message.content` from a non-streaming response body.
    fn extract_content(body: &str) -> Result<String, BackendError> {
        let response: CompletionResponse =
            serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BackendError::Malformed("no message content in first choice".into()))
    }

    async fn try_complete(
        &self,
        messages: &[ChatMessage],
        conversation_key: &str,
    ) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            user: conversation_key,
        };
        let response = self
            .client
            .post(self.config.chat_url())
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BackendError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        Self::extract_content(&body)
    }
}

#[async_trait]
impl LlmBackend for HttpBackendClient {
    #[instrument(skip(self, messages), fields(messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], conversation_key: &str) -> String {
        match self.try_complete(messages, conversation_key).await {
            Ok(content) => {
                info!(len = content.len(), "non-streaming completion received");
                content
            }
            Err(BackendError::Status(status)) => {
                warn!(status, "non-streaming completion rejected");
                format!("Ошибка API: {status}")
            }
            Err(e) => {
                error!(error = %e, "non-streaming completion failed; using fallback phrase");
                self.fallback_phrase()
            }
        }
    }

    fn stream_completion(&self, messages: &[ChatMessage], conversation_key: &str) -> FragmentStream {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            stream: true,
            user: conversation_key,
        };
        // The body is serialized here, so the returned stream owns everything it needs.
        let pending = self
            .client
            .post(self.config.chat_url())
            .query(&[("stream", "true")])
            .json(&request);
        let conversation_key = conversation_key.to_string();

        stream::once(async move {
            match pending.send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    debug!(conversation_key = %conversation_key, "stream opened");
                    fragments_from_body(response.bytes_stream())
                }
                Ok(response) => {
                    error!(
                        conversation_key = %conversation_key,
                        status = response.status().as_u16(),
                        "stream request rejected"
                    );
                    stream::empty().boxed()
                }
                Err(e) => {
                    error!(conversation_key = %conversation_key, error = %e, "stream request failed");
                    stream::empty().boxed()
                }
            }
        })
        .flatten()
        .boxed()
    }

    #[instrument(skip(self))]
    async fn clear_history(&self, chat_id: i64) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.config.clear_history_url())
            .timeout(self.config.request_timeout)
            .json(&ClearHistoryRequest {
                chat_id: chat_id.to_string(),
            })
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(BackendError::Status(status.as_u16()));
        }
        info!(chat_id, "backend history cleared");
        Ok(())
    }
}
