//! Transport abstraction for frame-level I/O
//!
//! Separates I/O concerns from protocol logic:
//! - **Transport**: How frames flow (WebSocket, ...)
//! - **Codec**: How messages are encoded/decoded (handled separately)
//! - **Port**: Typed messages on top of both (see `crate::port::bind`)
//!
//! A transport must preserve frame boundaries and deliver frames reliably,
//! in order, per direction. It provides no flow control; that is the sink
//! bridge's job.

pub mod websocket;

pub use websocket::{WebSocketConnection, WebSocketTransport};

use bytes::Bytes;
use tokio::sync::mpsc;

/// Channels for bidirectional communication with a transport
///
/// The transport owns the underlying I/O and communicates via these
/// channels. When the transport stops (shutdown or error), it closes
/// the channels.
pub struct TransportChannels {
    /// Receive frames from the transport
    ///
    /// Returns `None` when the transport has stopped.
    pub rx: mpsc::Receiver<Bytes>,

    /// Send frames to the transport
    pub tx: mpsc::Sender<Bytes>,
}
