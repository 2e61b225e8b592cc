//! Port Sink Bridge - flow-controlled sink over an asynchronous message port
//!
//! A producer writes chunks into a [`PortWriter`]; each chunk travels to a
//! consumer as a `write` message, and the consumer paces the producer with
//! `backpressure` messages (or stops it with `error`).
//!
//! ```ignore
//! let (sink_port, peer_port) = port::channel();
//! let mut writer = from_writable_port::<String>(sink_port, &SinkConfig::default(), stats);
//! writer.write("chunk".to_string()).await?; // waits for {"backpressure": false}
//! writer.close().await?;
//! ```

pub mod bridge;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod port;
pub mod protocol;
pub mod transport;

pub use bridge::{
    from_writable_port, GateStatus, PortSink, PortWriter, Ready, ReadyGate, SinkController,
    Stats, UnderlyingSink,
};
pub use config::{Config, SinkConfig};
pub use error::{BridgeError, Result, SinkError};
pub use port::{PeerPort, Port, SinkPort};
pub use protocol::{Reason, ReceiverMessage, SenderMessage};
