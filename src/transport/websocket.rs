//! WebSocket transport
//!
//! Connects to a consumer peer as a WebSocket client and relays frames
//! bidirectionally. One WebSocket message carries one frame; JSON frames
//! go out as text messages.
//!
//! Architecture:
//! ```text
//! PortWriter ──Port──► codec ──frames──► ws://peer ──► consumer
//!            ◄──────── codec ◄─frames─── ws://peer ◄──
//! ```

use super::TransportChannels;
use crate::constants::{CHANNEL_CAPACITY, SHUTDOWN_POLL_INTERVAL_MS};
use crate::error::{BridgeError, Result};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info};

/// WebSocket client transport
///
/// # Example
///
/// ```ignore
/// let connection = WebSocketTransport::new("ws://127.0.0.1:9000")
///     .connect(shutdown.clone())
///     .await?;
/// let port: SinkPort<String> = port::bind(connection.channels, JsonCodec);
/// ```
pub struct WebSocketTransport {
    url: String,
}

/// A live connection
pub struct WebSocketConnection {
    pub channels: TransportChannels,
    /// Completes once every outbound frame has been flushed and the
    /// socket closed (or shutdown was requested)
    pub flushed: JoinHandle<()>,
}

impl WebSocketTransport {
    /// Create a transport connecting to `url` (`ws://` or `wss://`)
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect and spawn the relay tasks
    ///
    /// The transport runs until `shutdown` is set, the peer disconnects,
    /// or the outbound channel is closed.
    pub async fn connect(self, shutdown: Arc<AtomicBool>) -> Result<WebSocketConnection> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| BridgeError::WebSocketConnect {
                url: self.url.clone(),
                source: Box::new(e),
            })?;
        info!("WebSocket connected: {}", self.url);

        let (in_tx, in_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let (out_tx, mut out_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let (mut ws_sink, mut ws_stream) = ws_stream.split();
        let poll_interval = Duration::from_millis(SHUTDOWN_POLL_INTERVAL_MS);

        // RX task: WebSocket → Channel
        let shutdown_rx = shutdown.clone();
        tokio::spawn(async move {
            while !shutdown_rx.load(Ordering::Relaxed) {
                match tokio::time::timeout(poll_interval, ws_stream.next()).await {
                    Ok(Some(Ok(msg))) => {
                        if msg.is_close() {
                            break;
                        }
                        // Ping/pong are handled by tungstenite
                        if (msg.is_text() || msg.is_binary())
                            && in_tx.send(msg.into_data()).await.is_err()
                        {
                            break; // Channel closed
                        }
                    }
                    Ok(Some(Err(e))) => {
                        debug!("WebSocket read error: {}", e);
                        break;
                    }
                    Ok(None) => break, // Connection closed
                    Err(_) => {}       // Timeout
                }
            }
            debug!("WebSocket reader stopped");
        });

        // TX task: Channel → WebSocket
        let shutdown_tx = shutdown;
        let flushed = tokio::spawn(async move {
            while !shutdown_tx.load(Ordering::Relaxed) {
                match tokio::time::timeout(poll_interval, out_rx.recv()).await {
                    Ok(Some(frame)) => {
                        if ws_sink.send(frame_message(frame)).await.is_err() {
                            break; // WebSocket error
                        }
                    }
                    Ok(None) => break, // Channel closed
                    Err(_) => {}       // Timeout
                }
            }
            // Try to close gracefully
            let _ = ws_sink.close().await;
            debug!("WebSocket writer stopped");
        });

        Ok(WebSocketConnection {
            channels: TransportChannels {
                rx: in_rx,
                tx: out_tx,
            },
            flushed,
        })
    }
}

/// UTF-8 frames go out as text, anything else as binary
fn frame_message(frame: Bytes) -> Message {
    match String::from_utf8(frame.to_vec()) {
        Ok(text) => Message::text(text),
        Err(_) => Message::binary(frame),
    }
}
