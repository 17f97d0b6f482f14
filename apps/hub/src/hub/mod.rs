/// Hub module - validator connections, probe dispatch and tick recording
///
/// The hub keeps every signed-up validator connection in a registry, sends
/// each of them one validate request per active target every round, and
/// turns signed replies into persisted observation ticks:
/// - `signup` verifies identity proofs and admits validators
/// - `scheduler` fans probe requests out on a fixed period
/// - `completion` matches replies to outstanding callbacks
/// - `sweeper` evicts callbacks that were never answered

pub mod callbacks;
pub mod completion;
pub mod registry;
pub mod scheduler;
pub mod signup;
pub mod sweeper;


pub use callbacks::{CallbackTable, PendingProbe};
pub use completion::{CompletionOutcome, RejectReason};
pub use registry::{ActiveConnection, ConnectionHandle, ConnectionId, ConnectionRegistry};
pub use scheduler::{DispatchSummary, ProbeScheduler};
pub use signup::SignupOutcome;
pub use sweeper::CallbackSweeper;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sentinel::{Envelope, HubMessage, ValidatorMessage};
use sentinel_store::Store;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Credit granted for each accepted tick
pub const DEFAULT_REWARD_PER_TICK: i64 = 100;

/// What became of one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Malformed,
    Signup(SignupOutcome),
    Validate(CompletionOutcome),
}

/// Shared hub state, handed to connection tasks and background loops as
/// `Arc<Hub>`
pub struct Hub {
    store: Arc<dyn Store>,
    registry: ConnectionRegistry,
    callbacks: CallbackTable,
    reward_per_tick: i64,
    next_connection_id: AtomicU64,
}

impl Hub {
    pub fn new(store: Arc<dyn Store>, reward_per_tick: i64) -> Self {
        Self {
            store,
            registry: ConnectionRegistry::new(),
            callbacks: CallbackTable::new(),
            reward_per_tick,
            next_connection_id: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn callbacks(&self) -> &CallbackTable {
        &self.callbacks
    }

    /// Allocate an id for a freshly accepted connection. It is not in the
    /// registry until it signs up.
    pub fn open_connection(&self, outbound: mpsc::Sender<HubMessage>) -> ConnectionHandle {
        let id = ConnectionId::new(self.next_connection_id.fetch_add(1, Ordering::Relaxed));
        debug!("Opened connection {}", id);
        ConnectionHandle::new(id, outbound)
    }

    /// Decode and route one text frame received on `handle`
    pub async fn handle_frame(&self, handle: &ConnectionHandle, text: &str) -> FrameOutcome {
        match ValidatorMessage::decode(text) {
            Ok(ValidatorMessage::Signup(request)) => {
                FrameOutcome::Signup(self.handle_signup(handle, request).await)
            }
            Ok(ValidatorMessage::Validate(reply)) => {
                FrameOutcome::Validate(self.handle_validate_reply(reply).await)
            }
            Err(e) => {
                warn!("Dropping malformed frame from {}: {}", handle.id(), e);
                FrameOutcome::Malformed
            }
        }
    }

    /// Forget a closed connection and any probes still waiting on it
    pub async fn disconnect(&self, id: ConnectionId) {
        let removed = self.registry.remove(id).await;
        let dropped = self.callbacks.drop_connection(id).await;

        match removed {
            Some(connection) => info!(
                "Validator {} disconnected ({}), {} pending callbacks dropped",
                connection.validator_id, id, dropped
            ),
            None => debug!("Connection {} closed before signing up", id),
        }
    }
}
