//! Shared test doubles: [`MockBot`] records every transport call, [`MockBackend`] replays a
//! scripted fragment stream.

#![allow(dead_code)]

use async_trait::async_trait;
use dbot_core::{Bot, Chat, ChatAction, CommandSpec, DbotError, Result, TextFormat, User};
use futures::stream::{self, StreamExt};
use llm_client::{BackendError, ChatMessage, FragmentStream, LlmBackend};
use relay_bot::RelaySettings;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::sync::Notify;

static INIT: Once = Once::new();

/// Test logging, enabled with RUST_LOG.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One recorded call to `edit_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub message_id: String,
    pub text: String,
    pub format: TextFormat,
    /// False when the mock rejected the edit.
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCall {
    Send(String),
    Placeholder(String),
    Edit(EditRecord),
    Typing,
    SetCommands(Vec<CommandSpec>),
}

/// Mock Bot that records calls and can reject MarkdownV2 edits or the placeholder.
#[derive(Default)]
pub struct MockBot {
    calls: Mutex<Vec<BotCall>>,
    next_id: AtomicI32,
    /// Number of upcoming MarkdownV2 edits to reject with a format error.
    reject_markdown_edits: AtomicUsize,
    fail_placeholder: AtomicBool,
}

impl MockBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI32::new(100),
            ..Default::default()
        })
    }

    pub fn reject_next_markdown_edits(&self, n: usize) {
        self.reject_markdown_edits.store(n, Ordering::SeqCst);
    }

    pub fn fail_placeholder(&self) {
        self.fail_placeholder.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: BotCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<BotCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<EditRecord> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BotCall::Edit(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Accepted MarkdownV2 edits, i.e. streamed chunks and the final answer.
    pub fn markdown_edits(&self) -> Vec<String> {
        self.edits()
            .into_iter()
            .filter(|e| e.ok && e.format == TextFormat::MarkdownV2)
            .map(|e| e.text)
            .collect()
    }

    /// Phrase rotation edits.
    pub fn plain_edits(&self) -> Vec<String> {
        self.edits()
            .into_iter()
            .filter(|e| e.format == TextFormat::Plain)
            .map(|e| e.text)
            .collect()
    }

    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BotCall::Send(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn typing_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BotCall::Typing))
            .count()
    }

    pub fn last_markdown_edit(&self) -> Option<String> {
        self.markdown_edits().pop()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> Result<()> {
        self.record(BotCall::Send(text.to_string()));
        Ok(())
    }

    async fn send_message_and_return_id(&self, _chat: &Chat, text: &str) -> Result<String> {
        if self.fail_placeholder.load(Ordering::SeqCst) {
            return Err(DbotError::Bot("chat not found".to_string()));
        }
        self.record(BotCall::Placeholder(text.to_string()));
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }

    async fn edit_message(
        &self,
        _chat: &Chat,
        message_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<()> {
        let reject = format == TextFormat::MarkdownV2
            && self
                .reject_markdown_edits
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        self.record(BotCall::Edit(EditRecord {
            message_id: message_id.to_string(),
            text: text.to_string(),
            format,
            ok: !reject,
        }));
        if reject {
            Err(DbotError::Format("can't parse entities".to_string()))
        } else {
            Ok(())
        }
    }

    async fn send_chat_action(&self, _chat: &Chat, _action: ChatAction) -> Result<()> {
        self.record(BotCall::Typing);
        Ok(())
    }

    async fn set_commands(&self, commands: &[CommandSpec]) -> Result<()> {
        self.record(BotCall::SetCommands(commands.to_vec()));
        Ok(())
    }
}

/// Backend replaying `(delay before fragment, fragment)` pairs.
#[derive(Default)]
pub struct MockBackend {
    script: Vec<(Duration, String)>,
    complete_reply: String,
    /// When set, the stream waits for a notification before its first fragment.
    gate: Option<Arc<Notify>>,
    panic_on_stream: bool,
    clear_fails: bool,
    pub stream_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
    pub cleared: Mutex<Vec<i64>>,
    pub last_window: Mutex<Vec<ChatMessage>>,
}

impl MockBackend {
    /// Fragments delivered back to back.
    pub fn streaming(fragments: &[&str]) -> Self {
        Self::timed(fragments.iter().map(|f| (0, *f)).collect())
    }

    /// Fragments with a delay (ms) before each one.
    pub fn timed(script: Vec<(u64, &str)>) -> Self {
        Self {
            script: script
                .into_iter()
                .map(|(ms, f)| (Duration::from_millis(ms), f.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_complete_reply(mut self, reply: &str) -> Self {
        self.complete_reply = reply.to_string();
        self
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_stream = true;
        self
    }

    pub fn failing_clear(mut self) -> Self {
        self.clear_fails = true;
        self
    }

    pub fn complete_count(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn stream_count(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, messages: &[ChatMessage], _conversation_key: &str) -> String {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_window.lock().unwrap() = messages.to_vec();
        self.complete_reply.clone()
    }

    fn stream_completion(&self, messages: &[ChatMessage], _conversation_key: &str) -> FragmentStream {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_stream {
            panic!("backend exploded");
        }
        *self.last_window.lock().unwrap() = messages.to_vec();

        let gate = self.gate.clone();
        let opened = stream::once(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
        })
        .filter_map(|_| async { None::<String> });

        let fragments = stream::iter(self.script.clone()).then(|(delay, fragment)| async move {
            tokio::time::sleep(delay).await;
            fragment
        });
        opened.chain(fragments).boxed()
    }

    async fn clear_history(&self, chat_id: i64) -> std::result::Result<(), BackendError> {
        self.cleared.lock().unwrap().push(chat_id);
        if self.clear_fails {
            Err(BackendError::Status(500))
        } else {
            Ok(())
        }
    }
}

pub fn test_chat() -> Chat {
    Chat::private(555)
}

pub fn test_user() -> User {
    User {
        id: 7,
        username: Some("student".to_string()),
        first_name: Some("Ann".to_string()),
        last_name: None,
    }
}

/// Defaults with short timers so paused-clock tests stay readable.
pub fn test_settings() -> RelaySettings {
    RelaySettings {
        max_history_messages: 12,
        min_edit_interval: Duration::from_millis(800),
        typing_interval: Duration::from_secs(4),
        phrase_rotation_interval: Duration::from_secs(3),
        rate_window_capacity: 100,
        phrases_path: String::new(),
    }
}
