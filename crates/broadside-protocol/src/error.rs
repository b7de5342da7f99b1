/// A frame that could not be produced or understood.
///
/// Neither case ends a connection. An inbound frame that fails to decode
/// is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Malformed JSON, a missing field, or a field of the wrong type.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
