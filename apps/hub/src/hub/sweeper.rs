use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::Hub;

/// Periodically evicts probe callbacks nobody answered
pub struct CallbackSweeper {
    hub: Arc<Hub>,
    ttl: Duration,
    every: Duration,
}

impl CallbackSweeper {
    pub fn new(hub: Arc<Hub>, ttl: Duration, every: Duration) -> Self {
        Self { hub, ttl, every }
    }

    pub async fn sweep_once(&self) -> usize {
        self.hub.callbacks().evict_expired(self.ttl).await
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.every);

            loop {
                interval.tick().await;

                match self.sweep_once().await {
                    0 => debug!("Callback sweep found nothing expired"),
                    evicted => info!(
                        "Evicted {} unanswered probe callbacks, {} still pending",
                        evicted,
                        self.hub.callbacks().len().await
                    ),
                }
            }
        })
    }
}
