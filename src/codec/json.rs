//! JSON codec
//!
//! Each message is a single compact JSON document, e.g.
//! `{"type":"backpressure","backpressure":false}`.

use super::MessageCodec;
use crate::error::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Compact JSON, one document per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(message)?))
    }

    fn decode<T: DeserializeOwned>(&self, frame: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::protocol::{ReceiverMessage, SenderMessage};

    #[test]
    fn test_encode_close() {
        let codec = JsonCodec;
        let frame = codec.encode(&SenderMessage::<String>::Close).unwrap();
        assert_eq!(frame.as_ref(), br#"{"type":"close"}"#);
    }

    #[test]
    fn test_decode_backpressure() {
        let codec = JsonCodec;
        let msg: ReceiverMessage = codec
            .decode(br#"{"type":"backpressure","backpressure":true}"#)
            .unwrap();
        assert_eq!(msg, ReceiverMessage::Backpressure { backpressure: true });
    }

    #[test]
    fn test_decode_missing_field() {
        let codec = JsonCodec;
        let result: Result<ReceiverMessage> = codec.decode(br#"{"type":"backpressure"}"#);
        assert!(matches!(result, Err(BridgeError::Codec { .. })));
    }

    #[test]
    fn test_decode_invalid_json() {
        let codec = JsonCodec;
        let result: Result<ReceiverMessage> = codec.decode(b"\xff\x00");
        assert!(result.is_err());
    }
}
