//! Room lifecycle, matchmaking, and event fan-out for Cardwire.
//!
//! This crate is the relay's core. It owns the only state with real
//! invariants behind it: which connection sits in which room, the
//! two-seat capacity, the once-per-room deck, and the join-order turn
//! assignment.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — owns the room map and the connection → room
//!   index; every join runs atomically inside it
//! - [`MatchmakingService`] — the join protocol: seat players, reject
//!   over-capacity joins, fire `start_game` when a room fills
//! - [`EventBroadcaster`] — delivers events to room peers, never to the
//!   sender
//! - [`DeckProvider`] — the external collaborator supplying one shuffled
//!   deck per room
//!
//! The registry sits behind one `tokio::sync::Mutex` shared by both
//! services: the check-and-admit sequence of a join is indivisible, and
//! broadcasts observe a consistent snapshot.

mod broadcast;
mod deck;
mod error;
mod matchmaking;
mod registry;
mod room;

pub use broadcast::EventBroadcaster;
pub use deck::DeckProvider;
pub use error::JoinError;
pub use matchmaking::{MatchmakingService, JOIN_REJECTED};
pub use registry::{JoinOutcome, RoomRegistry};
pub use room::{EventSink, Player, Room, RoomStatus, ROOM_CAPACITY};
