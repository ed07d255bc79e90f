//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a protocol type into a frame).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning a frame into a protocol type).
    /// Common causes: malformed JSON, missing fields, wrong types.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
