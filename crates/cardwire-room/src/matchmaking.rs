//! The join protocol: seating players and starting games.

use std::sync::Arc;

use cardwire_protocol::{RoomId, ServerEvent};
use tokio::sync::Mutex;

use crate::room::{EventSink, Player};
use crate::{DeckProvider, RoomRegistry};

/// The fixed client-facing rejection for any failed join.
///
/// Deliberately the same string whether the room was full or the
/// connection was already seated elsewhere — the deployed clients only
/// know this one message.
pub const JOIN_REJECTED: &str =
    "Room is full please choose another room to play!";

/// Implements the join protocol on top of [`RoomRegistry`].
///
/// Owns a handle to the shared registry mutex; each public method takes
/// the lock once, so the whole join (check, admit, emit) is one
/// critical section.
pub struct MatchmakingService<D: DeckProvider> {
    registry: Arc<Mutex<RoomRegistry<D>>>,
}

impl<D: DeckProvider> MatchmakingService<D> {
    /// Creates the service around the shared registry.
    pub fn new(registry: Arc<Mutex<RoomRegistry<D>>>) -> Self {
        Self { registry }
    }

    /// Handles a `join_game` request from `player`.
    ///
    /// On rejection, emits `room_join_error` with [`JOIN_REJECTED`] to
    /// the joiner. On success, emits `room_joined` to the joiner; and
    /// if this join filled the room, emits `start_game` to both seats —
    /// the first joiner is told to start and each side is told the
    /// opponent's username as its symbol.
    pub async fn join(
        &self,
        room_id: RoomId,
        player: Player,
        sink: EventSink,
    ) {
        let mut registry = self.registry.lock().await;
        let connection_id = player.connection_id;

        let outcome =
            match registry.try_join(room_id.clone(), player, sink.clone())
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::debug!(
                        %room_id,
                        %connection_id,
                        error = %err,
                        "join rejected"
                    );
                    let _ = sink.send(ServerEvent::RoomJoinError {
                        error: JOIN_REJECTED.to_owned(),
                    });
                    return;
                }
            };

        let _ = sink.send(ServerEvent::RoomJoined);

        if !outcome.became_full {
            return;
        }

        // Second seat just filled: the game starts. Join order decides
        // the turn order; `symbol` carries the opponent's name.
        if let ([first, second], Some(room)) =
            (outcome.players.as_slice(), registry.room(&room_id))
        {
            room.send_to(
                first.connection_id,
                ServerEvent::StartGame {
                    start: true,
                    symbol: second.username.clone(),
                },
            );
            room.send_to(
                second.connection_id,
                ServerEvent::StartGame {
                    start: false,
                    symbol: first.username.clone(),
                },
            );
            tracing::info!(%room_id, "game started");
        }
    }

    /// Handles `get_open_rooms`: ids of every room with one free seat.
    pub async fn open_rooms(&self) -> Vec<RoomId> {
        self.registry.lock().await.open_room_ids()
    }
}
