use async_trait::async_trait;
use dbot_core::{Bot, Handler, HandlerResponse, Message, MessageKind, Result};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::phrases::PhraseBook;

/// Answers stickers, photos, voice notes etc. with a canned "text only" reply.
pub struct MediaHandler {
    bot: Arc<dyn Bot>,
    phrases: Arc<PhraseBook>,
}

impl MediaHandler {
    pub fn new(bot: Arc<dyn Bot>, phrases: Arc<PhraseBook>) -> Self {
        Self { bot, phrases }
    }

    /// Phrase key for a non-text kind.
    pub fn phrase_key(kind: MessageKind) -> String {
        match kind {
            MessageKind::Other | MessageKind::Text => "media_unknown".to_string(),
            other => format!("media_{}", other.as_str()),
        }
    }
}

#[async_trait]
impl Handler for MediaHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, kind = message.kind.as_str()))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.is_text() {
            return Ok(HandlerResponse::Continue);
        }
        let reply = self.phrases.message(&Self::phrase_key(message.kind));
        self.bot.reply_to(message, &reply).await?;
        info!(user_id = message.user.id, "canned reply sent for non-text message");
        Ok(HandlerResponse::Reply(reply))
    }
}
