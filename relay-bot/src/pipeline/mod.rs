//! Streaming response pipeline: one admitted request from user text to final edited reply.
//!
//! ```text
//! admit → history + window → placeholder → [typing | rotation] → stream fragments
//!   → think filter → throttled render/edit → (empty? non-streaming) → final render/edit
//!   → cleanup: stop activities, release admission, record answer
//! ```
//!
//! Failures never escape [`StreamingPipeline::handle_message`]: they end in the fallback
//! phrase on the placeholder and a [`PipelineOutcome::Failed`].

mod activities;
mod state;
mod think;

pub use activities::BackgroundActivities;
pub use state::StreamState;
pub use think::{strip_think, visible_candidate, THINK_CLOSE, THINK_OPEN};

use dbot_core::{Bot, Chat, DbotError, TextFormat};
use futures::{FutureExt, StreamExt};
use llm_client::{ChatMessage, LlmBackend};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use telegram_format::{render_final_message, render_stream_chunk};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RelaySettings;
use crate::phrases::{PhraseBook, BUSY, FALLBACK, THINKING};
use crate::session::SessionRegistry;

/// Attempts per streaming edit (first try + one retry with the same text).
const STREAM_EDIT_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// User already had a request in flight; busy notice sent.
    Rejected,
    /// Streamed answer delivered.
    Completed,
    /// Stream was empty; the non-streaming answer was delivered.
    FallbackCompleted,
    /// Fallback phrase shown (or the placeholder could not be sent).
    Failed,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("placeholder message could not be sent: {0}")]
    Placeholder(#[source] DbotError),

    /// The answer exists but could not be shown; it is still recorded in history.
    #[error("final edit rejected twice: {source}")]
    FinalEdit {
        answer: String,
        #[source]
        source: DbotError,
    },

    #[error("answer is empty after removing the think section")]
    EmptyAnswer,
}

impl PipelineError {
    /// The backend answer carried by the error, if one was produced.
    pub fn into_answer(self) -> Option<String> {
        match self {
            PipelineError::FinalEdit { answer, .. } => Some(answer),
            _ => None,
        }
    }
}

struct Generation {
    outcome: PipelineOutcome,
    answer: String,
}

pub struct StreamingPipeline {
    bot: Arc<dyn Bot>,
    backend: Arc<dyn LlmBackend>,
    sessions: Arc<SessionRegistry>,
    phrases: Arc<PhraseBook>,
    settings: RelaySettings,
}

impl StreamingPipeline {
    pub fn new(
        bot: Arc<dyn Bot>,
        backend: Arc<dyn LlmBackend>,
        sessions: Arc<SessionRegistry>,
        phrases: Arc<PhraseBook>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            bot,
            backend,
            sessions,
            phrases,
            settings,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Runs one request end to end. `chat.id` keys history and throttling; `user_id` keys admission.
    #[instrument(skip(self, chat, text), fields(chat_id = chat.id, len = text.len()))]
    pub async fn handle_message(&self, chat: &Chat, user_id: i64, text: &str) -> PipelineOutcome {
        if !self.sessions.guard.try_admit(user_id) {
            info!("request rejected: previous one still in flight");
            if let Err(e) = self.bot.send_message(chat, &self.phrases.message(BUSY)).await {
                warn!(error = %e, "failed to send busy notice");
            }
            return PipelineOutcome::Rejected;
        }

        let history = &self.sessions.history;
        history.append_user_turn(chat.id, text);
        let window = history.windowed_history(chat.id, self.settings.max_history_messages);
        debug!(window = window.len(), "request window built");

        let placeholder_id = match self.send_placeholder(chat).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "aborting request");
                self.sessions.guard.release(user_id);
                return PipelineOutcome::Failed;
            }
        };

        let mut activities = BackgroundActivities::spawn(
            self.bot.clone(),
            chat.clone(),
            placeholder_id.clone(),
            self.phrases.clone(),
            self.settings.typing_interval,
            self.settings.phrase_rotation_interval,
        );

        let run = AssertUnwindSafe(self.generate(chat, &placeholder_id, &window, &mut activities))
            .catch_unwind()
            .await;
        let (outcome, answer) = match run {
            Ok(Ok(generation)) => {
                info!(outcome = ?generation.outcome, len = generation.answer.len(), "reply delivered");
                (generation.outcome, Some(generation.answer))
            }
            Ok(Err(e)) => {
                error!(error = %e, "generation failed");
                (PipelineOutcome::Failed, e.into_answer())
            }
            Err(_) => {
                error!("generation panicked");
                (PipelineOutcome::Failed, None)
            }
        };
        if outcome == PipelineOutcome::Failed {
            activities.stop_rotation().await;
            self.show_fallback(chat, &placeholder_id).await;
        }

        // Activities are joined before admission is released, so a new request from this
        // user never races a leftover edit of this placeholder.
        activities.shutdown().await;
        self.sessions.guard.release(user_id);

        if let Some(answer) = answer {
            history.append_assistant_turn(chat.id, answer);
        }
        outcome
    }

    async fn send_placeholder(&self, chat: &Chat) -> Result<String, PipelineError> {
        self.bot
            .send_message_and_return_id(chat, &self.phrases.random(THINKING))
            .await
            .map_err(PipelineError::Placeholder)
    }

    async fn generate(
        &self,
        chat: &Chat,
        placeholder_id: &str,
        window: &[ChatMessage],
        activities: &mut BackgroundActivities,
    ) -> Result<Generation, PipelineError> {
        let conversation_key = chat.id.to_string();
        let mut state = StreamState::default();
        let mut fragments = self.backend.stream_completion(window, &conversation_key);

        while let Some(fragment) = fragments.next().await {
            if fragment.is_empty() {
                continue;
            }
            let Some(candidate) = state.push_fragment(&fragment) else {
                continue;
            };
            if !self
                .sessions
                .rate
                .ready(chat.id, self.settings.min_edit_interval)
                .await
            {
                continue;
            }
            if !state.first_chunk_rendered {
                activities.stop_rotation().await;
                state.first_chunk_rendered = true;
            }
            self.sessions.rate.record(chat.id).await;
            if self
                .edit_streaming(chat, placeholder_id, &render_stream_chunk(&candidate))
                .await
            {
                state.edits += 1;
            }
        }
        debug!(
            fragments = state.fragments,
            edits = state.edits,
            think_open = state.think_open_seen,
            think_closed = state.think_closed_seen,
            "stream finished"
        );

        let (raw_answer, outcome) = if state.is_empty() {
            info!("stream produced no text; falling back to non-streaming request");
            (
                self.backend.complete(window, &conversation_key).await,
                PipelineOutcome::FallbackCompleted,
            )
        } else {
            (state.raw_answer, PipelineOutcome::Completed)
        };

        activities.stop_rotation().await;

        let answer = strip_think(&raw_answer);
        if answer.is_empty() {
            return Err(PipelineError::EmptyAnswer);
        }
        self.edit_final(chat, placeholder_id, &answer).await?;
        Ok(Generation { outcome, answer })
    }

    /// Returns true when the edit went through.
    async fn edit_streaming(&self, chat: &Chat, placeholder_id: &str, rendered: &str) -> bool {
        for attempt in 1..=STREAM_EDIT_ATTEMPTS {
            match self
                .bot
                .edit_message(chat, placeholder_id, rendered, TextFormat::MarkdownV2)
                .await
            {
                Ok(()) => return true,
                Err(e) => warn!(attempt, error = %e, "stream edit failed"),
            }
        }
        false
    }

    /// Full Markdown conversion first; on rejection, the escaped plain-safe rendering.
    async fn edit_final(
        &self,
        chat: &Chat,
        placeholder_id: &str,
        answer: &str,
    ) -> Result<(), PipelineError> {
        let formatted = render_final_message(answer);
        match self
            .bot
            .edit_message(chat, placeholder_id, &formatted, TextFormat::MarkdownV2)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, format_error = e.is_format_error(), "final edit rejected; retrying escaped");
                self.bot
                    .edit_message(
                        chat,
                        placeholder_id,
                        &render_stream_chunk(answer),
                        TextFormat::MarkdownV2,
                    )
                    .await
                    .map_err(|source| PipelineError::FinalEdit {
                        answer: answer.to_string(),
                        source,
                    })
            }
        }
    }

    async fn show_fallback(&self, chat: &Chat, placeholder_id: &str) {
        let text = render_stream_chunk(&self.phrases.random(FALLBACK));
        if let Err(e) = self
            .bot
            .edit_message(chat, placeholder_id, &text, TextFormat::MarkdownV2)
            .await
        {
            error!(error = %e, "failed to show fallback phrase");
        }
    }
}
