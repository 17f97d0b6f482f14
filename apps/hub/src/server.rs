use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use sentinel::{Envelope, HubMessage};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::hub::Hub;

/// Accept validator websocket connections until the listener fails
pub async fn serve(listener: TcpListener, hub: Arc<Hub>, queue: usize) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("failed to accept connection")?;
        let hub = Arc::clone(&hub);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, hub, queue).await {
                warn!("Connection from {} ended with error: {:#}", peer, e);
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    hub: Arc<Hub>,
    queue: usize,
) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .context("websocket handshake failed")?;
    let (mut write, mut read) = ws_stream.split();

    let (tx, mut rx) = mpsc::channel::<HubMessage>(queue.max(1));
    let handle = hub.open_connection(tx);
    let id = handle.id();
    info!("Accepted connection {} from {}", id, peer);

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match message.encode() {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode frame for {}: {}", id, e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(text)).await {
                debug!("Write to {} failed: {}", id, e);
                break;
            }
        }
        write.close().await.ok();
    });

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                hub.handle_frame(&handle, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => debug!("Ignoring binary frame from {}", id),
            Ok(_) => {}
            Err(e) => {
                debug!("Read from {} failed: {}", id, e);
                break;
            }
        }
    }

    hub.disconnect(id).await;
    drop(handle);
    writer.abort();
    info!("Connection {} from {} closed", id, peer);
    Ok(())
}
