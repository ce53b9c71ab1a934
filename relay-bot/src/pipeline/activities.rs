//! Typing pings and placeholder phrase rotation that run beside a generation.
//!
//! Both loops observe cancellation only at their sleep boundary, so an edit already in flight
//! completes before the task exits. Callers await the tasks after cancelling; once
//! [`BackgroundActivities::stop_rotation`] returns, nothing else edits the placeholder.

use dbot_core::{Bot, Chat, ChatAction, TextFormat};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::phrases::{PhraseBook, THINKING};

pub struct BackgroundActivities {
    cancel: CancellationToken,
    rotation_cancel: CancellationToken,
    typing: Option<JoinHandle<()>>,
    rotation: Option<JoinHandle<()>>,
}

impl BackgroundActivities {
    pub fn spawn(
        bot: Arc<dyn Bot>,
        chat: Chat,
        placeholder_id: String,
        phrases: Arc<PhraseBook>,
        typing_interval: Duration,
        rotation_interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let rotation_cancel = cancel.child_token();

        let typing = tokio::spawn(typing_loop(
            bot.clone(),
            chat.clone(),
            typing_interval,
            cancel.clone(),
        ));
        let rotation = tokio::spawn(rotation_loop(
            bot,
            chat,
            placeholder_id,
            phrases,
            rotation_interval,
            rotation_cancel.clone(),
        ));

        Self {
            cancel,
            rotation_cancel,
            typing: Some(typing),
            rotation: Some(rotation),
        }
    }

    /// Stops phrase rotation and waits for it. Idempotent.
    pub async fn stop_rotation(&mut self) {
        self.rotation_cancel.cancel();
        if let Some(handle) = self.rotation.take() {
            join("rotation", handle).await;
        }
    }

    /// Stops both activities and waits for them.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.rotation.take() {
            join("rotation", handle).await;
        }
        if let Some(handle) = self.typing.take() {
            join("typing", handle).await;
        }
    }
}

impl Drop for BackgroundActivities {
    fn drop(&mut self) {
        // Covers paths that never reach shutdown(): the loops still stop at their next sleep.
        self.cancel.cancel();
    }
}

async fn join(name: &'static str, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        if e.is_panic() {
            warn!(activity = name, "background activity panicked");
        }
    }
}

/// Returns true when cancelled before `interval` elapsed.
async fn cancelled_within(cancel: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(interval) => false,
    }
}

async fn typing_loop(bot: Arc<dyn Bot>, chat: Chat, interval: Duration, cancel: CancellationToken) {
    loop {
        if let Err(e) = bot.send_chat_action(&chat, ChatAction::Typing).await {
            debug!(chat_id = chat.id, error = %e, "typing action failed");
        }
        if cancelled_within(&cancel, interval).await {
            break;
        }
    }
}

async fn rotation_loop(
    bot: Arc<dyn Bot>,
    chat: Chat,
    placeholder_id: String,
    phrases: Arc<PhraseBook>,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        if cancelled_within(&cancel, interval).await {
            break;
        }
        let phrase = phrases.random(THINKING);
        if let Err(e) = bot
            .edit_message(&chat, &placeholder_id, &phrase, TextFormat::Plain)
            .await
        {
            debug!(chat_id = chat.id, error = %e, "phrase rotation edit failed");
        }
    }
}
