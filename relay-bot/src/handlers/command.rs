use async_trait::async_trait;
use dbot_core::{Bot, CommandSpec, Handler, HandlerResponse, Message, Result};
use llm_client::LlmBackend;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::phrases::{PhraseBook, INFO, RESET_FAILED, RESET_OK, START};
use crate::session::SessionRegistry;

/// Commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Info,
    ClearHistory,
}

impl BotCommand {
    pub const ALL: [BotCommand; 3] = [BotCommand::Start, BotCommand::ClearHistory, BotCommand::Info];

    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Start => "start",
            BotCommand::Info => "info",
            BotCommand::ClearHistory => "clear_history",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BotCommand::Start => "Запустить бота",
            BotCommand::Info => "Информация о боте",
            BotCommand::ClearHistory => "Очистить историю диалога",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Menu entries published at startup.
    pub fn specs() -> Vec<CommandSpec> {
        Self::ALL
            .iter()
            .map(|c| CommandSpec::new(c.name(), c.description()))
            .collect()
    }
}

/// Recognizes `/name`, `/name@bot_username` and `/name args…`. Unknown commands yield `None`.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let first = text.trim_start().split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    BotCommand::from_name(name)
}

pub struct CommandHandler {
    bot: Arc<dyn Bot>,
    backend: Arc<dyn LlmBackend>,
    sessions: Arc<SessionRegistry>,
    phrases: Arc<PhraseBook>,
}

impl CommandHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        backend: Arc<dyn LlmBackend>,
        sessions: Arc<SessionRegistry>,
        phrases: Arc<PhraseBook>,
    ) -> Self {
        Self {
            bot,
            backend,
            sessions,
            phrases,
        }
    }

    /// Drops local history, then asks the backend to do the same.
    async fn clear_history(&self, message: &Message) -> String {
        let chat_id = message.chat.id;
        self.sessions.history.clear(chat_id);
        match self.backend.clear_history(chat_id).await {
            Ok(()) => {
                info!(chat_id, "history cleared");
                self.phrases.message(RESET_OK)
            }
            Err(e) => {
                error!(chat_id, error = %e, "backend history reset failed");
                self.phrases.message(RESET_FAILED)
            }
        }
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.is_text() {
            return Ok(HandlerResponse::Continue);
        }
        let Some(command) = parse_command(&message.content) else {
            return Ok(HandlerResponse::Continue);
        };
        info!(user_id = message.user.id, command = command.name(), "command received");

        let reply = match command {
            BotCommand::Start => self.phrases.message(START),
            BotCommand::Info => self.phrases.message(INFO),
            BotCommand::ClearHistory => self.clear_history(message).await,
        };
        self.bot.reply_to(message, &reply).await?;
        Ok(HandlerResponse::Reply(reply))
    }
}
