use async_trait::async_trait;
use dbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::pipeline::StreamingPipeline;

/// Sends every remaining text message through the streaming pipeline.
pub struct RelayHandler {
    pipeline: Arc<StreamingPipeline>,
}

impl RelayHandler {
    pub fn new(pipeline: Arc<StreamingPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Handler for RelayHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.is_text() || message.content.trim().is_empty() {
            return Ok(HandlerResponse::Continue);
        }
        let outcome = self
            .pipeline
            .handle_message(&message.chat, message.user.id, &message.content)
            .await;
        info!(?outcome, "relay finished");
        Ok(HandlerResponse::Stop)
    }
}
