use std::sync::Arc;
use std::time::{Duration, Instant};

use sentinel::{HubMessage, ValidateRequest};
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{Hub, PendingProbe};

/// Counts for one dispatch round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub targets: usize,
    pub connections: usize,
    /// Requests queued on a connection
    pub issued: usize,
    /// Requests whose send failed; their callbacks were discarded
    pub dropped: usize,
}

impl Hub {
    /// Send one validate request per (active target, active connection)
    /// pair, each under a fresh callback id.
    pub async fn dispatch_round(&self) -> sentinel_store::Result<DispatchSummary> {
        let targets = self.store.list_active_targets().await?;
        let connections = self.registry.list_active().await;

        let mut summary = DispatchSummary {
            targets: targets.len(),
            connections: connections.len(),
            ..Default::default()
        };

        for target in &targets {
            for connection in &connections {
                let callback_id = Uuid::new_v4().to_string();

                // Registered first so a fast reply always finds its entry.
                self.callbacks
                    .register(PendingProbe {
                        callback_id: callback_id.clone(),
                        connection: connection.handle.id(),
                        validator_id: connection.validator_id.clone(),
                        public_key: connection.public_key.clone(),
                        target_id: target.id.clone(),
                        url: target.url.clone(),
                        issued_at: Instant::now(),
                    })
                    .await;

                let request = HubMessage::Validate(ValidateRequest {
                    url: target.url.clone(),
                    callback_id: callback_id.clone(),
                    target_id: target.id.clone(),
                });

                match connection.handle.send(request) {
                    Ok(()) => summary.issued += 1,
                    Err(e) => {
                        warn!(
                            "Failed to send probe for {} to validator {} over {}: {}",
                            target.id,
                            connection.validator_id,
                            connection.handle.id(),
                            e
                        );
                        self.callbacks.discard(&callback_id).await;
                        summary.dropped += 1;
                    }
                }
            }
        }

        Ok(summary)
    }
}

/// Runs [`Hub::dispatch_round`] on a fixed period
pub struct ProbeScheduler {
    hub: Arc<Hub>,
    period: Duration,
}

impl ProbeScheduler {
    pub fn new(hub: Arc<Hub>, period: Duration) -> Self {
        Self { hub, period }
    }

    /// Spawn the dispatch loop. The first round fires one period after
    /// start.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.period;
            let mut timer = interval_at(start, self.period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                timer.tick().await;

                match self.hub.dispatch_round().await {
                    Ok(summary) if summary.issued > 0 || summary.dropped > 0 => info!(
                        "Dispatched {} probes ({} dropped) for {} targets across {} validators",
                        summary.issued, summary.dropped, summary.targets, summary.connections
                    ),
                    Ok(summary) => debug!(
                        "Nothing to dispatch ({} targets, {} validators)",
                        summary.targets, summary.connections
                    ),
                    Err(e) => error!("Failed to load targets for dispatch: {}", e),
                }
            }
        })
    }
}
