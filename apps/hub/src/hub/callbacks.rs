use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::registry::ConnectionId;

/// A validate request that was sent and has not been answered yet
#[derive(Debug, Clone)]
pub struct PendingProbe {
    pub callback_id: String,
    pub connection: ConnectionId,
    pub validator_id: String,
    /// Key the reply must be signed with
    pub public_key: String,
    pub target_id: String,
    pub url: String,
    pub issued_at: Instant,
}

/// Outstanding probe callbacks keyed by callback id
///
/// Each entry is resolved at most once: [`CallbackTable::resolve`] removes
/// it, so a replayed reply finds nothing.
#[derive(Debug, Default)]
pub struct CallbackTable {
    pending: Mutex<HashMap<String, PendingProbe>>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, probe: PendingProbe) {
        let mut pending = self.pending.lock().await;
        pending.insert(probe.callback_id.clone(), probe);
    }

    /// Take the entry for `callback_id`, consuming it
    pub async fn resolve(&self, callback_id: &str) -> Option<PendingProbe> {
        self.pending.lock().await.remove(callback_id)
    }

    pub async fn discard(&self, callback_id: &str) -> bool {
        self.pending.lock().await.remove(callback_id).is_some()
    }

    /// Forget every callback issued over a closed connection
    pub async fn drop_connection(&self, connection: ConnectionId) -> usize {
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, probe| probe.connection != connection);
        before - pending.len()
    }

    /// Evict entries that have waited at least `ttl`
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, probe| probe.issued_at.elapsed() < ttl);
        before - pending.len()
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}
