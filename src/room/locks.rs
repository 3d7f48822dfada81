use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-session write locks. Read-modify-write sequences for one session id
/// serialize here; distinct sessions proceed in parallel. Shared between the
/// coordinator and the safety monitor so incident logging and syncs agree on
/// ordering.
#[derive(Clone, Default)]
pub struct SessionLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outer map lock is held only long enough to fetch or create the
    /// entry, never across the per-session acquisition.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().await;
            map.entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }

    /// Drops the lock entry for a session that reached a terminal state.
    pub async fn release(&self, session_id: &str) {
        self.inner.lock().await.remove(session_id);
    }
}
