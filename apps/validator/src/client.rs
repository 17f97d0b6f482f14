use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use sentinel::{Envelope, HubMessage, KeyPair, Prober, ValidatorMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::node::{ValidatorNode, run_probe};

/// Reconnect delays: doubled after each failure, capped, plus jitter
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max, current: initial }
    }

    /// Delay before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        let jitter = rand::random::<u64>() % (self.initial.as_millis() as u64).max(1);
        delay + Duration::from_millis(jitter)
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Keep a connection to the hub alive forever, signing up afresh on every
/// new connection
pub async fn connection_loop(
    hub_url: String,
    mut node: ValidatorNode,
    prober: Arc<dyn Prober>,
    mut backoff: Backoff,
) {
    loop {
        info!("Connecting to hub at {}", hub_url);

        match connect_and_handle(&hub_url, &mut node, &prober, &mut backoff).await {
            Ok(()) => info!("Hub closed the connection"),
            Err(e) => warn!("Hub connection failed: {:#}", e),
        }
        node.on_disconnect();

        let delay = backoff.next_delay();
        info!("Reconnecting in {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}

/// Run one connection until the hub goes away
async fn connect_and_handle(
    hub_url: &str,
    node: &mut ValidatorNode,
    prober: &Arc<dyn Prober>,
    backoff: &mut Backoff,
) -> anyhow::Result<()> {
    let (ws_stream, _response) = connect_async(hub_url).await.context("connect failed")?;
    let (mut write, mut read) = ws_stream.split();
    info!("Connected to hub");
    backoff.reset();

    write
        .send(Message::Text(node.begin_signup().encode()?))
        .await
        .context("failed to send signup")?;

    // Probe tasks hand their signed replies back through this channel.
    let (reply_tx, mut reply_rx) = mpsc::channel::<ValidatorMessage>(64);
    let keypair: Arc<KeyPair> = Arc::new(node.keypair().clone());

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match HubMessage::decode(&text) {
                        Ok(message) => {
                            for job in node.handle(message) {
                                let prober = Arc::clone(prober);
                                let keypair = Arc::clone(&keypair);
                                let reply_tx = reply_tx.clone();
                                tokio::spawn(async move {
                                    let reply = run_probe(prober.as_ref(), &keypair, job).await;
                                    reply_tx.send(ValidatorMessage::Validate(reply)).await.ok();
                                });
                            }
                        }
                        Err(e) => warn!("Dropping malformed hub frame: {}", e),
                    },
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await.context("failed to send pong")?;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Hub sent close: {:?}", frame);
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("websocket receive error"),
                    None => return Ok(()),
                }
            }

            Some(reply) = reply_rx.recv() => {
                write
                    .send(Message::Text(reply.encode()?))
                    .await
                    .context("failed to send reply")?;
            }
        }
    }
}
