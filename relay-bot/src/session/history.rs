use dashmap::DashMap;
use llm_client::ChatMessage;
use tracing::debug;

/// One stored message of a conversation (`user` or `assistant`).
pub type Turn = ChatMessage;

/// Per-chat bounded history, kept for the lifetime of the process.
///
/// Holds at most `2 × max_history` turns per chat (oldest dropped first); requests send only the
/// last `max_history`. Concurrent requests for one user are rejected upstream, so a chat's
/// history has a single writer at a time; the map shards only guard against other chats.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: DashMap<i64, Vec<Turn>>,
    max_history: usize,
}

impl ConversationStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            conversations: DashMap::new(),
            max_history,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    fn capacity(&self) -> usize {
        self.max_history * 2
    }

    fn append(&self, key: i64, turn: Turn) {
        let capacity = self.capacity();
        let mut turns = self.conversations.entry(key).or_default();
        turns.push(turn);
        if turns.len() > capacity {
            let excess = turns.len() - capacity;
            turns.drain(..excess);
            debug!(chat_id = key, dropped = excess, "history trimmed");
        }
    }

    pub fn append_user_turn(&self, key: i64, content: impl Into<String>) {
        self.append(key, Turn::user(content));
    }

    pub fn append_assistant_turn(&self, key: i64, content: impl Into<String>) {
        self.append(key, Turn::assistant(content));
    }

    /// The most recent `n` turns, oldest first.
    pub fn windowed_history(&self, key: i64, n: usize) -> Vec<Turn> {
        self.conversations
            .get(&key)
            .map(|turns| {
                let start = turns.len().saturating_sub(n);
                turns[start..].to_vec()
            })
            .unwrap_or_default()
    }

    pub fn clear(&self, key: i64) {
        self.conversations.remove(&key);
    }

    pub fn len(&self, key: i64) -> usize {
        self.conversations.get(&key).map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, key: i64) -> bool {
        self.len(key) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::MessageRole;

    #[test]
    fn test_trim_keeps_twice_max_and_window_is_most_recent() {
        let max = 3;
        let store = ConversationStore::new(max);
        for i in 0..(2 * max + 1) {
            store.append_user_turn(1, format!("m{i}"));
        }

        assert_eq!(store.len(1), 2 * max);
        let window = store.windowed_history(1, max);
        let contents: Vec<&str> = window.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["m4", "m5", "m6"]);
    }

    #[test]
    fn test_window_shorter_than_n() {
        let store = ConversationStore::new(12);
        store.append_user_turn(1, "hi");
        store.append_assistant_turn(1, "hello");
        let window = store.windowed_history(1, 12);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].role, MessageRole::User);
        assert_eq!(window[1].role, MessageRole::Assistant);
        assert!(store.windowed_history(2, 12).is_empty());
    }

    #[test]
    fn test_clear_only_affects_one_chat() {
        let store = ConversationStore::new(12);
        store.append_user_turn(1, "a");
        store.append_user_turn(2, "b");
        store.clear(1);
        assert!(store.is_empty(1));
        assert_eq!(store.len(2), 1);
    }
}
