//! Server-Sent-Events framing for streamed completions.
//!
//! Bytes arrive in arbitrary chunks: a UTF-8 sequence or an event may be split across them, so
//! the decoder keeps both undecoded bytes and undelimited text between calls.

use futures::stream::{self, StreamExt};
use futures::Stream;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt::Display;
use tracing::{debug, warn};

use crate::FragmentStream;

/// Incremental SSE decoder yielding the payload of every `data:` line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    text: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one body chunk; returns `data:` payloads of every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        self.decode_pending();
        self.drain_events()
    }

    /// Flushes the last event when the body ends without a blank line.
    pub fn finish(&mut self) -> Vec<String> {
        if !self.pending.is_empty() {
            debug!(bytes = self.pending.len(), "dropping incomplete UTF-8 tail at end of stream");
            self.pending.clear();
        }
        let rest = std::mem::take(&mut self.text);
        data_lines(&rest)
    }

    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(decoded) => {
                    self.text.push_str(decoded);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for the next chunk.
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(invalid) => {
                            debug!(invalid, "skipping invalid UTF-8 bytes in stream");
                            self.pending.drain(..valid + invalid);
                        }
                    }
                }
            }
        }
        if self.text.contains('\r') {
            self.text = self.text.replace("\r\n", "\n");
        }
    }

    fn drain_events(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();
        while let Some(end) = self.text.find("\n\n") {
            let event: String = self.text.drain(..end + 2).collect();
            payloads.extend(data_lines(&event));
        }
        payloads
    }
}

fn data_lines(event: &str) -> Vec<String> {
    event
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|payload| payload.trim().to_string())
        .collect()
}

/// What one `data:` payload means for the fragment sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsePayload {
    /// `[DONE]` terminator.
    Done,
    /// Non-empty `choices[0].delta.content`.
    Fragment(String),
    /// Valid chunk without content (role-only delta, empty payload, ...).
    Skip,
    /// Not parseable as a chunk object.
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

pub fn parse_payload(payload: &str) -> SsePayload {
    let payload = payload.trim();
    if payload == "[DONE]" {
        return SsePayload::Done;
    }
    if payload.is_empty() {
        return SsePayload::Skip;
    }
    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(SsePayload::Fragment)
            .unwrap_or(SsePayload::Skip),
        Err(e) => SsePayload::Malformed(e.to_string()),
    }
}

struct FragmentState<S> {
    body: std::pin::Pin<Box<S>>,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    finished: bool,
}

impl<S> FragmentState<S> {
    fn absorb(&mut self, payloads: Vec<String>) {
        for payload in payloads {
            if self.finished {
                return;
            }
            match parse_payload(&payload) {
                SsePayload::Done => self.finished = true,
                SsePayload::Fragment(content) => self.ready.push_back(content),
                SsePayload::Skip => {}
                SsePayload::Malformed(error) => {
                    warn!(error = %error, payload = %payload, "skipping malformed stream chunk");
                }
            }
        }
    }
}

/// Turns a chunked response body into the fragment sequence.
///
/// Ends on `[DONE]`, on body end, or on a body read error (logged).
pub fn fragments_from_body<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = FragmentState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };
    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.ready.pop_front() {
                return Some((fragment, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let payloads = state.decoder.feed(chunk.as_ref());
                    state.absorb(payloads);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "stream body read failed; ending fragments");
                    state.finished = true;
                }
                None => {
                    let payloads = state.decoder.finish();
                    state.absorb(payloads);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}
