//! Sink bridge over a message port
//!
//! Layers, bottom-up:
//! - `gate`: the single readiness gate (pending/resolved/rejected)
//! - `sink`: the sink contract and its error-signaling controller
//! - `port_sink`: the backpressure state machine speaking the port protocol
//! - `session`: the task that owns the state machine
//! - `writer`: the producer handle (`PortWriter`, also a `futures_util::Sink`)

pub mod gate;
pub mod port_sink;
mod session;
pub mod sink;
pub mod stats;
pub mod writer;

pub use gate::{GateStatus, Ready, ReadyGate};
pub use port_sink::PortSink;
pub use sink::{SinkController, UnderlyingSink};
pub use stats::{Stats, StatsSnapshot};
pub use writer::{from_writable_port, PortWriter};
