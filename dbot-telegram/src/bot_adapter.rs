//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code talks to Telegram; tests substitute another Bot impl.

use async_trait::async_trait;
use dbot_core::{
    parse_message_id, Bot as CoreBot, Chat, ChatAction, CommandSpec, DbotError, Result, TextFormat,
};
use teloxide::payloads::EditMessageTextSetters;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ChatId, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::debug;

/// True when Telegram returns "message is not modified" (content unchanged); treat as success.
pub fn is_message_not_modified_error(error: &str) -> bool {
    error.contains("message is not modified") || error.contains("exactly the same")
}

fn not_modified(e: &RequestError) -> bool {
    matches!(e, RequestError::Api(ApiError::MessageNotModified))
        || is_message_not_modified_error(&e.to_string())
}

/// Markup rejections become [`DbotError::Format`] so callers can retry with safer text.
fn map_request_error(e: RequestError) -> DbotError {
    match e {
        RequestError::Api(ApiError::CantParseEntities(detail)) => DbotError::Format(detail),
        other => {
            let text = other.to_string();
            if text.contains("can't parse entities") {
                DbotError::Format(text)
            } else {
                DbotError::Bot(text)
            }
        }
    }
}

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(sent.id.to_string())
    }

    async fn edit_message(
        &self,
        chat: &Chat,
        message_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<()> {
        let id = parse_message_id(message_id)?;
        let request = self
            .bot
            .edit_message_text(ChatId(chat.id), MessageId(id), text.to_string());
        let result = match format {
            TextFormat::Plain => request.await,
            TextFormat::MarkdownV2 => request.parse_mode(ParseMode::MarkdownV2).await,
        };
        match result {
            Ok(_) => Ok(()),
            Err(e) if not_modified(&e) => {
                debug!(chat_id = chat.id, message_id = %message_id, "edit skipped: message not modified");
                Ok(())
            }
            Err(e) => Err(map_request_error(e)),
        }
    }

    async fn send_chat_action(&self, chat: &Chat, action: ChatAction) -> Result<()> {
        let action = match action {
            ChatAction::Typing => teloxide::types::ChatAction::Typing,
        };
        self.bot
            .send_chat_action(ChatId(chat.id), action)
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn set_commands(&self, commands: &[CommandSpec]) -> Result<()> {
        let commands: Vec<BotCommand> = commands
            .iter()
            .map(|c| BotCommand::new(c.command.clone(), c.description.clone()))
            .collect();
        self.bot
            .set_my_commands(commands)
            .await
            .map_err(map_request_error)?;
        Ok(())
    }
}
