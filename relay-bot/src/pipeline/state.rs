use super::think::{visible_candidate, THINK_CLOSE, THINK_OPEN};

/// Per-request streaming state; dropped when the run ends.
#[derive(Debug, Default)]
pub struct StreamState {
    pub raw_answer: String,
    pub think_open_seen: bool,
    pub think_closed_seen: bool,
    pub first_chunk_rendered: bool,
    pub fragments: usize,
    pub edits: usize,
}

impl StreamState {
    /// Appends a fragment and returns the text that may be shown now, if any.
    pub fn push_fragment(&mut self, fragment: &str) -> Option<String> {
        self.raw_answer.push_str(fragment);
        self.fragments += 1;
        self.think_open_seen |= self.raw_answer.contains(THINK_OPEN);
        self.think_closed_seen |= self.raw_answer.contains(THINK_CLOSE);
        visible_candidate(&self.raw_answer)
    }

    /// True when the stream delivered nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.raw_answer.trim().is_empty()
    }
}
