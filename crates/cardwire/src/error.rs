//! Unified error type for the Cardwire gateway.

use cardwire_protocol::ProtocolError;
use cardwire_transport::TransportError;

/// Top-level error for building and running a server.
///
/// The room layer's `JoinError` is deliberately absent: joins are
/// rejected over the wire as `room_join_error` events and never bubble
/// out of the services as Rust errors.
#[derive(Debug, thiserror::Error)]
pub enum CardwireError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
