//! `<think>…</think>` suppression, for the finished answer and for a still-growing one.

use regex::Regex;
use std::sync::LazyLock;

pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

static THINK_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("static pattern"));

/// Removes closed spans, then cuts at an unclosed opening marker. Not trimmed.
fn without_think(text: &str) -> String {
    let mut visible = THINK_SPAN.replace_all(text, "").into_owned();
    if let Some(open) = visible.find(THINK_OPEN) {
        visible.truncate(open);
    }
    visible
}

/// Final cleanup of a complete answer: think spans removed, unclosed tail cut, whitespace trimmed.
pub fn strip_think(text: &str) -> String {
    without_think(text).trim().to_string()
}

/// Drops a trailing proper prefix of `<think>` (`<`, `<t`, … `<think`), which may be the start
/// of a marker whose rest is still in flight.
fn hold_back_partial_marker(text: &str) -> &str {
    for len in (1..THINK_OPEN.len()).rev() {
        if text.ends_with(&THINK_OPEN[..len]) {
            return &text[..text.len() - len];
        }
    }
    text
}

/// What may be shown for a partially received answer; `None` when there is nothing to show yet.
pub fn visible_candidate(raw: &str) -> Option<String> {
    let visible = without_think(raw);
    let visible = hold_back_partial_marker(&visible);
    if visible.trim().is_empty() {
        None
    } else {
        Some(visible.to_string())
    }
}
