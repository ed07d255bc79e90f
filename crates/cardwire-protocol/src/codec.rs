//! Codec trait and the JSON implementation.
//!
//! A codec converts between protocol types and the text that rides in a
//! WebSocket frame. The rest of the stack is written against the
//! [`Codec`] trait, not against `serde_json`, so the relay's framing
//! could change without touching the gateway or the room layer. In
//! practice the relay speaks JSON: the update-relay contract forwards
//! arbitrary client JSON values untouched, which no schema-bound format
//! could represent.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes protocol values into text frames and decodes them back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame of text.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError>;

    /// Deserializes one frame of text back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the text is malformed or
    /// doesn't match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use cardwire_protocol::{Codec, JsonCodec, ServerEvent};
///
/// let codec = JsonCodec;
/// let frame = codec.encode(&ServerEvent::RoomJoined).unwrap();
/// assert_eq!(frame, r#"{"event":"room_joined"}"#);
///
/// let decoded: ServerEvent = codec.decode(&frame).unwrap();
/// assert_eq!(decoded, ServerEvent::RoomJoined);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
