//! Process-wide session state: conversation history, in-flight admission and edit throttling.
//!
//! Built once at startup and shared by reference with every pipeline run.

mod guard;
mod history;
mod rate;

pub use guard::ConcurrencyGuard;
pub use history::{ConversationStore, Turn};
pub use rate::RateWindow;

use crate::config::RelaySettings;

/// Owns the three shared maps the pipeline works against.
#[derive(Debug)]
pub struct SessionRegistry {
    pub history: ConversationStore,
    pub guard: ConcurrencyGuard,
    pub rate: RateWindow,
}

impl SessionRegistry {
    pub fn new(settings: &RelaySettings) -> Self {
        Self {
            history: ConversationStore::new(settings.max_history_messages),
            guard: ConcurrencyGuard::new(),
            rate: RateWindow::new(settings.rate_window_capacity),
        }
    }
}
