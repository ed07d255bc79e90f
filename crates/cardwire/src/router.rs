//! The event dispatch table.
//!
//! Routing is an explicit map from event-name string to handler
//! function, built once at startup. It carries no semantics of its own:
//! handlers parse whatever payload they need and call into the room
//! services. Unknown event names are ignored with a debug log.

use std::collections::HashMap;
use std::sync::Arc;

use cardwire_protocol::{inbound, Envelope, JoinGamePayload, ServerEvent};
use cardwire_room::{DeckProvider, EventSink, Player};
use cardwire_transport::ConnectionId;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::server::GatewayState;

/// One registered event handler.
///
/// Plain function pointers keep the table trivially cloneable and
/// `Send`; each returns a boxed future because the handlers are async.
type HandlerFn<D> = fn(
    Arc<GatewayState<D>>,
    ConnectionId,
    EventSink,
    Value,
) -> BoxFuture<'static, ()>;

/// Maps inbound event names to their handlers.
pub(crate) struct Router<D: DeckProvider> {
    routes: HashMap<&'static str, HandlerFn<D>>,
}

impl<D: DeckProvider> Router<D> {
    /// Builds the table with every protocol event registered.
    pub(crate) fn new() -> Self {
        let mut routes: HashMap<&'static str, HandlerFn<D>> =
            HashMap::new();
        routes.insert(inbound::GET_OPEN_ROOMS, get_open_rooms);
        routes.insert(inbound::JOIN_GAME, join_game);
        routes.insert(inbound::UPDATE_GAME, update_game);
        routes.insert(
            inbound::BROADCAST_ACTION_MESSAGE,
            broadcast_action_message,
        );
        Self { routes }
    }

    /// Dispatches one decoded envelope to its registered handler.
    pub(crate) async fn dispatch(
        &self,
        state: Arc<GatewayState<D>>,
        connection_id: ConnectionId,
        sink: &EventSink,
        envelope: Envelope,
    ) {
        match self.routes.get(envelope.event.as_str()) {
            Some(handler) => {
                handler(state, connection_id, sink.clone(), envelope.data)
                    .await;
            }
            None => {
                tracing::debug!(
                    event = %envelope.event,
                    %connection_id,
                    "no handler registered for event, ignoring"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers, one per inbound event
// ---------------------------------------------------------------------------

fn get_open_rooms<D: DeckProvider>(
    state: Arc<GatewayState<D>>,
    _connection_id: ConnectionId,
    sink: EventSink,
    _data: Value,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        let rooms = state.matchmaking.open_rooms().await;
        let _ = sink.send(ServerEvent::OpenRooms(rooms));
    })
}

fn join_game<D: DeckProvider>(
    state: Arc<GatewayState<D>>,
    connection_id: ConnectionId,
    sink: EventSink,
    data: Value,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        let payload: JoinGamePayload = match serde_json::from_value(data) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(
                    %connection_id,
                    error = %e,
                    "malformed join_game payload, ignoring"
                );
                return;
            }
        };
        let player = Player {
            connection_id,
            username: payload.user.username,
        };
        state.matchmaking.join(payload.room_id, player, sink).await;
    })
}

fn update_game<D: DeckProvider>(
    state: Arc<GatewayState<D>>,
    connection_id: ConnectionId,
    _sink: EventSink,
    data: Value,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        state.broadcaster.relay_game_update(connection_id, data).await;
    })
}

fn broadcast_action_message<D: DeckProvider>(
    state: Arc<GatewayState<D>>,
    connection_id: ConnectionId,
    _sink: EventSink,
    data: Value,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        state
            .broadcaster
            .relay_action_message(connection_id, data)
            .await;
    })
}
