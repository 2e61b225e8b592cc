//! Message ports
//!
//! A `Port<Out, In>` is one endpoint of an ordered, asynchronous duplex
//! message channel: it sends `Out` values and receives `In` values, each
//! direction delivered in send order. Ports carry no flow control of
//! their own; sends never block.
//!
//! Ports come from two places:
//! - `channel()`: an in-process pair, one port per side
//! - `bind()`: typed messages over a byte transport, using a codec

use crate::codec::MessageCodec;
use crate::protocol::{ReceiverMessage, SenderMessage};
use crate::transport::TransportChannels;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Producer-side port: sends `SenderMessage`, receives `ReceiverMessage`
pub type SinkPort<W> = Port<SenderMessage<W>, ReceiverMessage>;

/// Consumer-side port: the mirror of `SinkPort`
pub type PeerPort<W> = Port<ReceiverMessage, SenderMessage<W>>;

/// One endpoint of a duplex message channel
#[derive(Debug)]
pub struct Port<Out, In> {
    tx: mpsc::UnboundedSender<Out>,
    rx: mpsc::UnboundedReceiver<In>,
}

impl<Out, In> Port<Out, In> {
    pub fn new(tx: mpsc::UnboundedSender<Out>, rx: mpsc::UnboundedReceiver<In>) -> Self {
        Self { tx, rx }
    }

    /// Post a message to the other side
    ///
    /// Returns `false` if the other side is gone.
    pub fn send(&self, message: Out) -> bool {
        self.tx.send(message).is_ok()
    }

    /// Next inbound message; `None` once the other side is gone
    pub async fn recv(&mut self) -> Option<In> {
        self.rx.recv().await
    }

    /// Non-blocking receive
    pub fn try_recv(&mut self) -> Option<In> {
        self.rx.try_recv().ok()
    }

    /// Split into the outbound sender and the inbound receiver
    pub fn split(self) -> (mpsc::UnboundedSender<Out>, mpsc::UnboundedReceiver<In>) {
        (self.tx, self.rx)
    }
}

/// Create an in-process port pair
pub fn channel<A, B>() -> (Port<A, B>, Port<B, A>) {
    let (a_tx, a_rx) = mpsc::unbounded_channel::<A>();
    let (b_tx, b_rx) = mpsc::unbounded_channel::<B>();
    (Port::new(a_tx, b_rx), Port::new(b_tx, a_rx))
}

/// Bind a typed port onto byte-level transport channels
///
/// Spawns two relay tasks:
/// - encoder: `Out` messages → codec → transport
/// - decoder: transport → codec → `In` messages
///
/// Undecodable inbound frames are dropped with a warning. When the
/// transport stops, the port's inbound side closes.
pub fn bind<Out, In, C>(channels: TransportChannels, codec: C) -> Port<Out, In>
where
    Out: Serialize + Send + 'static,
    In: DeserializeOwned + Send + 'static,
    C: MessageCodec,
{
    let codec = Arc::new(codec);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Out>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<In>();
    let TransportChannels {
        rx: mut transport_rx,
        tx: transport_tx,
    } = channels;

    // Encoder task: Port → Transport
    let encoder = codec.clone();
    tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            match encoder.encode(&message) {
                Ok(frame) => {
                    if transport_tx.send(frame).await.is_err() {
                        debug!("Transport closed, stopping encoder");
                        break;
                    }
                }
                Err(e) => warn!("Dropping unencodable message: {}", e),
            }
        }
    });

    // Decoder task: Transport → Port
    tokio::spawn(async move {
        while let Some(frame) = transport_rx.recv().await {
            match codec.decode::<In>(&frame) {
                Ok(message) => {
                    if in_tx.send(message).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Dropping undecodable frame ({} bytes): {}", frame.len(), e),
            }
        }
    });

    Port::new(out_tx, in_rx)
}
