//! Core protocol types for Cardwire's wire format.
//!
//! Everything here gets serialized to a JSON text frame, sent over the
//! socket, and parsed on the other side. The shapes below are pinned by
//! the unit tests at the bottom of this file — a mismatch means deployed
//! clients can no longer parse the relay's frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a room.
///
/// Room ids are chosen by clients (the first joiner names the room), so
/// this is an opaque string, not a server-issued counter. The newtype
/// keeps it from being confused with usernames or other plain strings in
/// function signatures.
///
/// `#[serde(transparent)]` serializes a `RoomId("r1")` as just `"r1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// Inbound event names, as they appear in the `event` field.
///
/// The gateway registers one handler per name in its dispatch table.
pub mod inbound {
    /// Query for all rooms waiting on a second player.
    pub const GET_OPEN_ROOMS: &str = "get_open_rooms";
    /// Request to take a seat in a room.
    pub const JOIN_GAME: &str = "join_game";
    /// Game-state update to relay to the room peer.
    pub const UPDATE_GAME: &str = "update_game";
    /// Free-text action message to relay to the room peer.
    pub const BROADCAST_ACTION_MESSAGE: &str = "broadcast_action_message";
}

/// The raw shape of every inbound frame.
///
/// Decoded before routing; the `data` payload stays untyped until the
/// handler for `event` decides what (if anything) to parse out of it.
/// Events like `get_open_rooms` carry no `data` at all, hence the
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The event name, looked up in the gateway's dispatch table.
    pub event: String,
    /// The event payload; `Value::Null` when the frame omits it.
    #[serde(default)]
    pub data: Value,
}

/// Typed payload of a `join_game` event.
///
/// Field names are camelCase on the wire (`roomId`), matching what the
/// web client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGamePayload {
    /// The room the client wants to sit down in.
    pub room_id: RoomId,
    /// Who is joining.
    pub user: UserProfile,
}

/// The client-supplied identity inside a `join_game` payload.
///
/// The username is opaque display data — never validated, never unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Every event the relay can send to a client.
///
/// `#[serde(tag = "event", content = "data")]` produces the adjacently
/// tagged wire shape — `{ "event": "start_game", "data": { ... } }` —
/// and `rename_all = "snake_case"` turns the variant names into exactly
/// the event strings the clients listen for. A unit variant like
/// [`ServerEvent::RoomJoined`] serializes with no `data` key at all.
///
/// The `On*Update` relay variants carry [`Value`] because the relay
/// forwards client-reported game fields without interpreting them; an
/// absent field is forwarded as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `get_open_rooms`: ids of rooms with one free seat.
    OpenRooms(Vec<RoomId>),

    /// Acknowledges a successful `join_game` to the joiner.
    RoomJoined,

    /// Rejects a `join_game`. The message is a fixed human-readable
    /// string; it does not say *why* the join failed.
    RoomJoinError { error: String },

    /// Sent to both seats when the second player arrives. `start` is
    /// whether this recipient plays first; `symbol` is the opponent's
    /// username.
    StartGame { start: bool, symbol: String },

    /// Full `update_game` payload, echoed to the room peer.
    OnGameUpdate(Value),

    /// The `currentPlayer` field of an `update_game` payload.
    OnCurrentPlayerUpdate(Value),

    /// The `remainingCards` field of an `update_game` payload.
    OnRemainingCardsUpdate(Value),

    /// The `activeSuit` field of an `update_game` payload.
    OnActiveSuitUpdate(Value),

    /// The `message` field of a `broadcast_action_message` payload.
    OnActionMessageUpdate(Value),
}

// =========================================================================
// Tests
// =========================================================================
