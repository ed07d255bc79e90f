//! Event fan-out: deliver to everyone in the sender's room but the
//! sender.

use std::sync::Arc;

use cardwire_protocol::{RoomId, ServerEvent};
use cardwire_transport::ConnectionId;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{DeckProvider, RoomRegistry};

/// Field of an `update_game` payload projected to the peer.
const CURRENT_PLAYER: &str = "currentPlayer";
/// Field of an `update_game` payload projected to the peer.
const REMAINING_CARDS: &str = "remainingCards";
/// Field of an `update_game` payload projected to the peer.
const ACTIVE_SUIT: &str = "activeSuit";
/// Field of a `broadcast_action_message` payload projected to the peer.
const MESSAGE: &str = "message";

/// Delivers domain events to room peers and answers membership queries.
///
/// Resolution goes through the registry's connection → room index. An
/// origin with no room is a silent no-op: it cannot happen through the
/// normal protocol (the client only sends updates once seated), so it
/// is logged at debug and dropped rather than surfaced as an error.
pub struct EventBroadcaster<D: DeckProvider> {
    registry: Arc<Mutex<RoomRegistry<D>>>,
}

impl<D: DeckProvider> EventBroadcaster<D> {
    /// Creates the broadcaster around the shared registry.
    pub fn new(registry: Arc<Mutex<RoomRegistry<D>>>) -> Self {
        Self { registry }
    }

    /// The room containing a connection, if it is seated anywhere.
    pub async fn room_of(
        &self,
        connection_id: ConnectionId,
    ) -> Option<RoomId> {
        self.registry.lock().await.room_of(connection_id).cloned()
    }

    /// Delivers one event to every member of origin's room except
    /// origin itself.
    pub async fn broadcast(
        &self,
        origin: ConnectionId,
        event: ServerEvent,
    ) {
        self.fan_out(origin, vec![event]).await;
    }

    /// Relays an `update_game` payload to the room peer as four
    /// discrete events: the full payload echo, then one projection per
    /// game field. A field absent from the payload still produces its
    /// projection event, carrying `null` — the relay never validates
    /// what the client reported.
    pub async fn relay_game_update(
        &self,
        origin: ConnectionId,
        payload: Value,
    ) {
        let events = vec![
            ServerEvent::OnGameUpdate(payload.clone()),
            ServerEvent::OnCurrentPlayerUpdate(project(
                &payload,
                CURRENT_PLAYER,
            )),
            ServerEvent::OnRemainingCardsUpdate(project(
                &payload,
                REMAINING_CARDS,
            )),
            ServerEvent::OnActiveSuitUpdate(project(&payload, ACTIVE_SUIT)),
        ];
        self.fan_out(origin, events).await;
    }

    /// Relays a `broadcast_action_message` payload to the room peer as
    /// one event carrying its `message` field.
    pub async fn relay_action_message(
        &self,
        origin: ConnectionId,
        payload: Value,
    ) {
        let message = project(&payload, MESSAGE);
        self.fan_out(
            origin,
            vec![ServerEvent::OnActionMessageUpdate(message)],
        )
        .await;
    }

    /// Resolves origin's room and sends the events to its peers, in
    /// order, under one registry lock (one consistent snapshot).
    async fn fan_out(
        &self,
        origin: ConnectionId,
        events: Vec<ServerEvent>,
    ) {
        let registry = self.registry.lock().await;
        let room = registry
            .room_of(origin)
            .and_then(|room_id| registry.room(room_id));

        let Some(room) = room else {
            tracing::debug!(
                %origin,
                "broadcast from a connection with no room, dropping"
            );
            return;
        };

        for event in events {
            room.send_to_peers(origin, event);
        }
    }
}

/// Pulls one field out of a payload; `null` when absent (or when the
/// payload isn't an object at all).
fn project(payload: &Value, field: &str) -> Value {
    payload.get(field).cloned().unwrap_or(Value::Null)
}
