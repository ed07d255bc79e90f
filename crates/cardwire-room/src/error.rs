//! Error types for the room layer.

use cardwire_protocol::RoomId;
use cardwire_transport::ConnectionId;

/// Ways a join attempt can be rejected.
///
/// Both variants surface to the client as the same fixed
/// `room_join_error` message (see [`crate::JOIN_REJECTED`]); the
/// distinction only exists for server logs.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    /// Both seats in the room are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The connection already occupies a seat — in this room or any
    /// other. One connection, one seat.
    #[error("connection {0} is already seated in room {1}")]
    AlreadySeated(ConnectionId, RoomId),
}
