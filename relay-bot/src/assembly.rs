//! Assembly: builds shared state, the pipeline and the handler chain; runs the bot.

use anyhow::{Context, Result};
use dbot_core::{init_tracing, Bot};
use dbot_telegram::{run_repl, TelegramBotAdapter};
use handler_chain::HandlerChain;
use llm_client::{HttpBackendClient, LlmBackend};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::{BotConfig, RelaySettings};
use crate::handlers::{BotCommand, CommandHandler, MediaHandler, RelayHandler};
use crate::phrases::{PhraseBook, FALLBACK};
use crate::pipeline::StreamingPipeline;
use crate::session::SessionRegistry;

/// Media → Command → Relay, sharing one session registry.
pub fn build_handler_chain(
    bot: Arc<dyn Bot>,
    backend: Arc<dyn LlmBackend>,
    phrases: Arc<PhraseBook>,
    settings: RelaySettings,
) -> (HandlerChain, Arc<StreamingPipeline>) {
    let sessions = Arc::new(SessionRegistry::new(&settings));
    let pipeline = Arc::new(StreamingPipeline::new(
        bot.clone(),
        backend.clone(),
        sessions.clone(),
        phrases.clone(),
        settings,
    ));

    let chain = HandlerChain::new()
        .add_handler(Arc::new(MediaHandler::new(bot.clone(), phrases.clone())))
        .add_handler(Arc::new(CommandHandler::new(bot, backend, sessions, phrases)))
        .add_handler(Arc::new(RelayHandler::new(pipeline.clone())));

    (chain, pipeline)
}

/// Validates config, loads phrases, builds the backend client and runs the Telegram REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    let phrases = Arc::new(PhraseBook::load(&config.relay.phrases_path));
    let fallback_phrases = phrases.clone();
    let backend: Arc<dyn LlmBackend> = Arc::new(
        HttpBackendClient::new(
            config.llm.clone(),
            Arc::new(move || fallback_phrases.random(FALLBACK)),
        )
        .context("Failed to build backend HTTP client")?,
    );

    let teloxide_bot = config.telegram.build_bot()?;
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    if let Err(e) = bot.set_commands(&BotCommand::specs()).await {
        warn!(error = %e, "Failed to publish command list");
    }

    let (chain, _pipeline) = build_handler_chain(bot, backend, phrases, config.relay.clone());

    info!(
        backend = %config.llm.chat_url(),
        model = %config.llm.model,
        max_history = config.relay.max_history_messages,
        "Bot started successfully"
    );
    run_repl(teloxide_bot, chain).await
}
