//! Bot abstraction: the chat transport the pipeline talks to.
//!
//! [`Bot`] is transport-agnostic; dbot-telegram implements it via teloxide, tests implement it with
//! recording mocks.

use crate::error::{DbotError, Result};
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// How the transport should interpret message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Shown verbatim.
    Plain,
    /// Telegram MarkdownV2; the transport fails with [`DbotError::Format`] on invalid markup.
    MarkdownV2,
}

/// Chat status shown next to the bot's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
}

/// One entry of the command menu published at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: String,
    pub description: String,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

/// Abstraction for sending and editing messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    /// Sends a plain text message and returns its id for later [`Bot::edit_message`] calls.
    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String>;

    /// Replaces the text of an already-sent message. `message_id` is transport-specific (Telegram: numeric string).
    async fn edit_message(
        &self,
        chat: &Chat,
        message_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<()>;

    /// Shows a chat action such as "typing…" for a few seconds.
    async fn send_chat_action(&self, chat: &Chat, action: ChatAction) -> Result<()>;

    /// Publishes the bot's command menu.
    async fn set_commands(&self, commands: &[CommandSpec]) -> Result<()>;
}

/// Parses a message id string into an i32. Used by edit_message implementations.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| DbotError::Bot(format!("Invalid message_id for edit: {}", s)))
}
