//! Codec abstraction for port messages
//!
//! Separates encoding concerns from transport:
//! - **Codec**: How messages become frames (JSON, ...)
//! - **Transport**: How frames flow (WebSocket, in-process, ...)
//!
//! One message is always one frame; transports preserve frame boundaries.

pub mod json;

pub use json::JsonCodec;

use crate::error::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Codec trait for encoding/decoding port messages
pub trait MessageCodec: Send + Sync + 'static {
    /// Encode one message into one frame
    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes>;

    /// Decode one frame into one message
    fn decode<T: DeserializeOwned>(&self, frame: &[u8]) -> Result<T>;
}
