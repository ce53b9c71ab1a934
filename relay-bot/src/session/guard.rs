use dashmap::DashSet;

/// Set of users with a request in flight. At most one pipeline run per user.
#[derive(Debug, Default)]
pub struct ConcurrencyGuard {
    pending: DashSet<i64>,
}

impl ConcurrencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic check-and-insert; false when the user already has a request in flight.
    pub fn try_admit(&self, user_id: i64) -> bool {
        self.pending.insert(user_id)
    }

    /// Idempotent.
    pub fn release(&self, user_id: i64) {
        self.pending.remove(&user_id);
    }

    pub fn is_pending(&self, user_id: i64) -> bool {
        self.pending.contains(&user_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
