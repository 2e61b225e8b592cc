//! Port protocol messages
//!
//! Two message families travel over a port, one per direction:
//! - `SenderMessage`: producer → consumer (`write`, `close`, `abort`)
//! - `ReceiverMessage`: consumer → producer (`backpressure`, `error`)
//!
//! Both are internally tagged by a `type` field so the JSON form is:
//!
//! ```text
//! {"type":"write","chunk":...} | {"type":"close"} | {"type":"abort","reason":...}
//! {"type":"backpressure","backpressure":true} | {"type":"error","reason":...}
//! ```

mod reason;

pub use reason::Reason;

use serde::{Deserialize, Serialize};

/// Message sent by the producer side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SenderMessage<W> {
    /// One data item
    Write { chunk: W },
    /// No further writes; finalize normally
    Close,
    /// No further writes; finalize abnormally
    Abort {
        #[serde(default)]
        reason: Reason,
    },
}

impl<W> SenderMessage<W> {
    /// Message name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Write { .. } => "write",
            Self::Close => "close",
            Self::Abort { .. } => "abort",
        }
    }
}

/// Message sent by the consumer side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReceiverMessage {
    /// Consumer capacity: `true` = not ready for more writes
    Backpressure { backpressure: bool },
    /// Consumer-side failure
    ///
    /// Peers that fail with no reason omit the field entirely.
    Error {
        #[serde(default)]
        reason: Reason,
    },
}

impl ReceiverMessage {
    /// Message name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Backpressure { .. } => "backpressure",
            Self::Error { .. } => "error",
        }
    }
}
