//! A single room: two seats, one deck, and the outbound channels of
//! whoever is sitting down.

use cardwire_protocol::{RoomId, ServerEvent};
use cardwire_transport::ConnectionId;
use tokio::sync::mpsc;

/// How many players a room seats. The whole protocol is two-player.
pub const ROOM_CAPACITY: usize = 2;

/// Channel sender for delivering outbound events to one connection.
///
/// Cheap to clone; the gateway's writer task holds the receiving end.
pub type EventSink = mpsc::UnboundedSender<ServerEvent>;

/// A seated participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// The transport connection this player arrived on. One connection
    /// is one player.
    pub connection_id: ConnectionId,
    /// Client-supplied display name, opaque to the relay.
    pub username: String,
}

/// One occupied seat: the player plus the channel to reach them.
struct Seat {
    player: Player,
    sink: EventSink,
}

/// Derived room state. Not stored — computed from the seat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// One seat free; the room shows up in `get_open_rooms`.
    Open,
    /// Both seats taken.
    Full,
}

impl RoomStatus {
    /// Returns `true` if the room is waiting on a second player.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A room holding up to [`ROOM_CAPACITY`] players and one deck.
///
/// Seats are kept in join order — the order decides who starts (see the
/// matchmaking layer). `T` is the provider's deck state; the room never
/// inspects it, it only keeps it alive for the game's duration.
pub struct Room<T> {
    id: RoomId,
    seats: Vec<Seat>,
    deck: T,
}

impl<T> Room<T> {
    pub(crate) fn new(id: RoomId, deck: T) -> Self {
        Self {
            id,
            seats: Vec::with_capacity(ROOM_CAPACITY),
            deck,
        }
    }

    /// Returns the room's id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Returns the derived room status.
    pub fn status(&self) -> RoomStatus {
        if self.seats.len() >= ROOM_CAPACITY {
            RoomStatus::Full
        } else {
            RoomStatus::Open
        }
    }

    /// Number of occupied seats.
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// The seated players, in join order.
    pub fn players(&self) -> Vec<Player> {
        self.seats.iter().map(|s| s.player.clone()).collect()
    }

    /// The deck created for this room.
    pub fn deck(&self) -> &T {
        &self.deck
    }

    /// Returns `true` if the connection holds a seat here.
    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.seats
            .iter()
            .any(|s| s.player.connection_id == connection_id)
    }

    pub(crate) fn is_full(&self) -> bool {
        self.seats.len() >= ROOM_CAPACITY
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Seats a player. The caller (the registry) has already checked
    /// capacity under its lock.
    pub(crate) fn admit(&mut self, player: Player, sink: EventSink) {
        debug_assert!(!self.is_full());
        self.seats.push(Seat { player, sink });
    }

    /// Frees the seat held by `connection_id`, if any.
    pub(crate) fn evict(&mut self, connection_id: ConnectionId) {
        self.seats
            .retain(|s| s.player.connection_id != connection_id);
    }

    /// Sends an event to one seated connection. Silently drops the
    /// event if the receiver is gone.
    pub fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) {
        if let Some(seat) = self
            .seats
            .iter()
            .find(|s| s.player.connection_id == connection_id)
        {
            let _ = seat.sink.send(event);
        }
    }

    /// Sends an event to every seat except `origin`.
    pub fn send_to_peers(
        &self,
        origin: ConnectionId,
        event: ServerEvent,
    ) {
        for seat in &self.seats {
            if seat.player.connection_id != origin {
                let _ = seat.sink.send(event.clone());
            }
        }
    }
}
