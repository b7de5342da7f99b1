//! Wire format.
//!
//! Everything on the socket is JSON. Handlers still go through [`Codec`]
//! rather than calling `serde_json` directly, so there is one place that
//! decides how bytes map to messages.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Maps messages to frame bytes and back.
///
/// Decoded values own their data, so the frame buffer can be dropped
/// as soon as `decode` returns.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// The JSON [`Codec`].
///
/// # Example
///
/// ```rust
/// use broadside_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec.decode(br#"{"type":"attack","x":3,"y":4}"#).unwrap();
/// assert_eq!(msg, ClientMessage::Attack { x: 3, y: 4 });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientMessage, ServerMessage};

    #[test]
    fn test_decode_malformed_json_returns_decode_error() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_utf8_json() {
        let bytes = JsonCodec.encode(&ServerMessage::YourTurn {}).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"type":"your_turn"}"#);
    }
}
