//! Centralized error types for the sink bridge
//!
//! - `BridgeError`: setup and infrastructure failures (config, transport, codec)
//! - `SinkError`: failures observed by a producer writing into a `PortWriter`
//!
//! Use `Result<T>` as shorthand for `std::result::Result<T, BridgeError>`.

use crate::protocol::Reason;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// All bridge errors
#[derive(Debug)]
pub enum BridgeError {
    // === Transport ===
    /// Failed to connect the WebSocket client
    WebSocketConnect {
        url: String,
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },

    // === Codec ===
    /// Message could not be encoded or decoded
    Codec { source: serde_json::Error },

    // === IO ===
    /// File system operation failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Runtime ===
    /// Tokio runtime creation failed
    Runtime { source: std::io::Error },

    // === Sink ===
    /// The producer side of the bridge failed
    Sink(SinkError),
    /// Consumer did not announce readiness in time
    ReadyTimeout { after: Duration },
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. }
            | Self::ConfigRead { source, .. }
            | Self::Runtime { source } => Some(source),
            Self::WebSocketConnect { source, .. } => Some(source.as_ref()),
            Self::Codec { source } => Some(source),
            Self::Sink(source) => Some(source),
            Self::ConfigValidation { .. } | Self::ReadyTimeout { .. } => None,
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSocketConnect { url, .. } => write!(f, "Cannot connect to {}", url),
            Self::Codec { source } => write!(f, "Codec error: {}", source),
            Self::Io { path, .. } => write!(f, "IO error: {}", path.display()),
            Self::ConfigRead { path, .. } => {
                write!(f, "Cannot read config file: {}", path.display())
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::Runtime { .. } => write!(f, "Failed to create runtime"),
            Self::Sink(e) => write!(f, "{}", e),
            Self::ReadyTimeout { after } => {
                write!(f, "Consumer not ready after {} ms", after.as_millis())
            }
        }
    }
}

impl From<SinkError> for BridgeError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(source: serde_json::Error) -> Self {
        Self::Codec { source }
    }
}

/// Alias for Result with BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure observed by a producer
#[derive(Debug, Clone, PartialEq)]
pub enum SinkError {
    /// The consumer reported an error, or the port went away
    Errored(Reason),
    /// The producer aborted the sink
    Aborted(Reason),
    /// Write or close issued after the sink was closed
    Closed,
    /// The session task owning the sink is gone
    SessionEnded,
}

impl SinkError {
    /// Reason carried by the error, if any
    pub fn reason(&self) -> Option<&Reason> {
        match self {
            Self::Errored(r) | Self::Aborted(r) => Some(r),
            Self::Closed | Self::SessionEnded => None,
        }
    }
}

impl std::error::Error for SinkError {}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Errored(reason) => write!(f, "Sink errored: {}", reason),
            Self::Aborted(reason) => write!(f, "Sink aborted: {}", reason),
            Self::Closed => write!(f, "Sink is closed"),
            Self::SessionEnded => write!(f, "Sink session ended"),
        }
    }
}
