//! Room registry: owns every room and the connection → room index.
//!
//! All join-path invariants live here. The registry is plain data — the
//! layers above share it behind one `tokio::sync::Mutex`, so everything
//! inside a single method call is atomic with respect to every other
//! registry operation. In particular the check-and-admit sequence in
//! [`RoomRegistry::try_join`] can never interleave with a competing
//! join for the last seat.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use cardwire_protocol::RoomId;
use cardwire_transport::ConnectionId;

use crate::room::{EventSink, Player, Room};
use crate::{DeckProvider, JoinError};

/// What a successful join looked like, for the matchmaking layer.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// `true` if this join took the second seat.
    pub became_full: bool,
    /// The full seat list after the join, in join order.
    pub players: Vec<Player>,
}

/// Owns the mapping from room id to room state and enforces the join
/// invariants: two seats per room, one seat per connection, one deck
/// per room lifetime.
///
/// Rooms are created lazily — the first join into an unknown id brings
/// the room (and its deck) into existence. A registered room always
/// holds at least one seat: it is created around its first player and
/// dropped by [`leave`](Self::leave) when its last seat empties.
pub struct RoomRegistry<D: DeckProvider> {
    /// Active rooms, keyed by room id.
    rooms: HashMap<RoomId, Room<D::Deck>>,

    /// Maps each seated connection to its room. A connection can hold
    /// at most ONE seat at a time; this index is how that is checked,
    /// rather than deriving membership from the transport's grouping.
    seats: HashMap<ConnectionId, RoomId>,

    /// The collaborator that shuffles a deck for each new room.
    provider: D,
}

impl<D: DeckProvider> RoomRegistry<D> {
    /// Creates an empty registry around a deck provider.
    pub fn new(provider: D) -> Self {
        Self {
            rooms: HashMap::new(),
            seats: HashMap::new(),
            provider,
        }
    }

    /// Ids of all rooms with exactly one free seat.
    ///
    /// Order is stable for a given map state but otherwise unspecified;
    /// callers display it, nothing more.
    pub fn open_room_ids(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|(_, room)| room.status().is_open())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// The room a connection is seated in, if any.
    pub fn room_of(&self, connection_id: ConnectionId) -> Option<&RoomId> {
        self.seats.get(&connection_id)
    }

    /// Looks up a room by id.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room<D::Deck>> {
        self.rooms.get(room_id)
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Atomically evaluates and applies a join.
    ///
    /// Rejects the attempt if the connection already holds a seat
    /// anywhere ([`JoinError::AlreadySeated`]) or if both of the room's
    /// seats are taken ([`JoinError::RoomFull`]). A rejected join
    /// mutates nothing — in particular it never creates a room.
    ///
    /// On a join into a nonexistent room, a deck is requested from the
    /// provider and stored before the player is admitted; the deck is
    /// never requested again for that room.
    pub fn try_join(
        &mut self,
        room_id: RoomId,
        player: Player,
        sink: EventSink,
    ) -> Result<JoinOutcome, JoinError> {
        if let Some(current) = self.seats.get(&player.connection_id) {
            return Err(JoinError::AlreadySeated(
                player.connection_id,
                current.clone(),
            ));
        }

        let connection_id = player.connection_id;
        let (became_full, players) = match self.rooms.entry(room_id.clone())
        {
            Entry::Occupied(mut entry) => {
                let room = entry.get_mut();
                if room.is_full() {
                    return Err(JoinError::RoomFull(room_id));
                }
                room.admit(player, sink);
                (room.is_full(), room.players())
            }
            Entry::Vacant(entry) => {
                let deck = self.provider.shuffled_deck();
                let room = entry.insert(Room::new(room_id.clone(), deck));
                room.admit(player, sink);
                tracing::info!(%room_id, "room created");
                (false, room.players())
            }
        };

        self.seats.insert(connection_id, room_id.clone());
        tracing::info!(
            %room_id,
            %connection_id,
            players = players.len(),
            "player seated"
        );

        Ok(JoinOutcome {
            became_full,
            players,
        })
    }

    /// Frees the seat held by a connection.
    ///
    /// This is the leave/disconnect hook the gateway calls when a
    /// socket closes. Removes the index entry and the seat; a room
    /// whose last seat empties is dropped, releasing its deck. Returns
    /// the room the connection was seated in, or `None` if it held no
    /// seat.
    pub fn leave(
        &mut self,
        connection_id: ConnectionId,
    ) -> Option<RoomId> {
        let room_id = self.seats.remove(&connection_id)?;
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.evict(connection_id);
            if room.is_empty() {
                self.rooms.remove(&room_id);
                tracing::info!(%room_id, "room emptied and dropped");
            }
        }
        tracing::info!(%room_id, %connection_id, "seat freed");
        Some(room_id)
    }
}
