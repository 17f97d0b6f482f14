use std::collections::BTreeMap;
use std::fmt;

use sentinel::HubMessage;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Hub-local identity of one websocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Sending half of a connection; frames are queued for its writer task
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<HubMessage>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, outbound: mpsc::Sender<HubMessage>) -> Self {
        Self { id, outbound }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame without waiting. Fails when the queue is full or the
    /// connection's writer has gone away.
    pub fn send(&self, message: HubMessage) -> Result<(), TrySendError<HubMessage>> {
        self.outbound.try_send(message)
    }
}

/// A signed-up validator reachable over a live connection
#[derive(Debug, Clone)]
pub struct ActiveConnection {
    pub handle: ConnectionHandle,
    pub validator_id: String,
    pub public_key: String,
}

/// Live validator connections, keyed by connection
///
/// A validator that opens two connections is listed twice; a second signup
/// over the same connection replaces the first entry.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<BTreeMap<ConnectionId, ActiveConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registration this one replaced, if any
    pub async fn add(&self, connection: ActiveConnection) -> Option<ActiveConnection> {
        let mut connections = self.connections.write().await;
        connections.insert(connection.handle.id(), connection)
    }

    pub async fn remove(&self, id: ConnectionId) -> Option<ActiveConnection> {
        self.connections.write().await.remove(&id)
    }

    /// Snapshot of the registry; callers never hold the lock while sending
    pub async fn list_active(&self) -> Vec<ActiveConnection> {
        self.connections.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(id: u64, validator_id: &str) -> (ActiveConnection, mpsc::Receiver<HubMessage>) {
        let (tx, rx) = mpsc::channel(4);
        let connection = ActiveConnection {
            handle: ConnectionHandle::new(ConnectionId::new(id), tx),
            validator_id: validator_id.to_string(),
            public_key: format!("pk-{validator_id}"),
        };
        (connection, rx)
    }

    #[tokio::test]
    async fn test_same_validator_on_two_connections_is_listed_twice() {
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = active(1, "v1");
        let (second, _rx2) = active(2, "v1");

        assert!(registry.add(first).await.is_none());
        assert!(registry.add(second).await.is_none());

        let active = registry.list_active().await;
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|c| c.validator_id == "v1"));
    }

    #[tokio::test]
    async fn test_resignup_on_same_connection_replaces_entry() {
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = active(1, "v1");
        let (again, _rx2) = active(1, "v2");

        registry.add(first).await;
        let replaced = registry.add(again).await.expect("previous entry");

        assert_eq!(replaced.validator_id, "v1");
        let active = registry.list_active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].validator_id, "v2");
    }

    #[tokio::test]
    async fn test_remove_unknown_connection_is_noop() {
        let registry = ConnectionRegistry::new();
        let (first, _rx) = active(1, "v1");
        registry.add(first).await;

        assert!(registry.remove(ConnectionId::new(7)).await.is_none());
        assert!(registry.remove(ConnectionId::new(1)).await.is_some());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_send_fails_once_receiver_dropped() {
        let (connection, rx) = active(1, "v1");
        drop(rx);

        let message = HubMessage::Signup(sentinel::SignupAck {
            validator_id: "v1".into(),
            callback_id: "cb".into(),
        });
        assert!(connection.handle.send(message).is_err());
    }
}
