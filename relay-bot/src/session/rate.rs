use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Last edit time per chat, bounded: chats that go quiet are evicted least-recently-used first.
#[derive(Debug)]
pub struct RateWindow {
    last_edit: Mutex<LruCache<i64, Instant>>,
}

impl RateWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            last_edit: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// True when no edit for `chat_id` happened within `interval` (or none is remembered).
    pub async fn ready(&self, chat_id: i64, interval: Duration) -> bool {
        let cache = self.last_edit.lock().await;
        cache
            .peek(&chat_id)
            .map_or(true, |last| last.elapsed() >= interval)
    }

    pub async fn record(&self, chat_id: i64) {
        self.last_edit.lock().await.put(chat_id, Instant::now());
    }

    pub async fn len(&self) -> usize {
        self.last_edit.lock().await.len()
    }
}
