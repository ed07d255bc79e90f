//! Integration tests for the room core: registry invariants, the join
//! protocol, and peer fan-out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cardwire_protocol::{RoomId, ServerEvent};
use cardwire_room::{
    DeckProvider, EventBroadcaster, EventSink, JoinError,
    MatchmakingService, Player, RoomRegistry, JOIN_REJECTED,
};
use cardwire_transport::ConnectionId;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};

// =========================================================================
// Mock deck provider that counts how often it is asked to shuffle.
// =========================================================================

#[derive(Default)]
struct CountingDeck {
    shuffles: Arc<AtomicUsize>,
}

impl DeckProvider for CountingDeck {
    type Deck = u32;

    fn shuffled_deck(&self) -> u32 {
        self.shuffles.fetch_add(1, Ordering::SeqCst);
        52
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn conn(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn player(id: u64, name: &str) -> Player {
    Player {
        connection_id: conn(id),
        username: name.into(),
    }
}

fn room(id: &str) -> RoomId {
    RoomId::from(id)
}

/// Creates a dummy event sink (receiver is dropped immediately).
fn dummy_sink() -> EventSink {
    mpsc::unbounded_channel().0
}

fn registry() -> (RoomRegistry<CountingDeck>, Arc<AtomicUsize>) {
    let shuffles = Arc::new(AtomicUsize::new(0));
    let provider = CountingDeck {
        shuffles: Arc::clone(&shuffles),
    };
    (RoomRegistry::new(provider), shuffles)
}

fn services(
) -> (MatchmakingService<CountingDeck>, EventBroadcaster<CountingDeck>) {
    let (reg, _) = registry();
    let shared = Arc::new(Mutex::new(reg));
    (
        MatchmakingService::new(Arc::clone(&shared)),
        EventBroadcaster::new(shared),
    )
}

/// Drains every pending event from a receiver.
fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// =========================================================================
// RoomRegistry tests
// =========================================================================

#[test]
fn test_try_join_creates_room_and_requests_deck_once() {
    let (mut reg, shuffles) = registry();

    let outcome = reg
        .try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();
    assert!(!outcome.became_full);
    assert_eq!(outcome.players.len(), 1);
    assert_eq!(shuffles.load(Ordering::SeqCst), 1);
    assert_eq!(reg.room(&room("r1")).unwrap().deck(), &52);

    // Second join fills the room but must not reshuffle.
    let outcome = reg
        .try_join(room("r1"), player(2, "Bob"), dummy_sink())
        .unwrap();
    assert!(outcome.became_full);
    assert_eq!(outcome.players.len(), 2);
    assert_eq!(shuffles.load(Ordering::SeqCst), 1);
}

#[test]
fn test_try_join_orders_players_by_join_order() {
    let (mut reg, _) = registry();
    reg.try_join(room("r1"), player(7, "Bob"), dummy_sink())
        .unwrap();
    let outcome = reg
        .try_join(room("r1"), player(3, "Alice"), dummy_sink())
        .unwrap();

    let names: Vec<_> = outcome
        .players
        .into_iter()
        .map(|p| p.username)
        .collect();
    assert_eq!(names, ["Bob", "Alice"]);
}

#[test]
fn test_try_join_rejects_third_player() {
    let (mut reg, shuffles) = registry();
    reg.try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();
    reg.try_join(room("r1"), player(2, "Bob"), dummy_sink())
        .unwrap();

    let err = reg
        .try_join(room("r1"), player(3, "Carol"), dummy_sink())
        .unwrap_err();
    assert!(matches!(err, JoinError::RoomFull(_)));

    // No mutation: membership unchanged, no extra shuffle.
    assert!(reg.room_of(conn(3)).is_none());
    assert_eq!(reg.room(&room("r1")).unwrap().player_count(), 2);
    assert_eq!(shuffles.load(Ordering::SeqCst), 1);
}

#[test]
fn test_try_join_rejects_connection_seated_elsewhere() {
    let (mut reg, shuffles) = registry();
    reg.try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();

    let err = reg
        .try_join(room("r2"), player(1, "Alice"), dummy_sink())
        .unwrap_err();
    assert!(matches!(err, JoinError::AlreadySeated(_, _)));

    // The target room must never have been created — no deck either.
    assert!(reg.room(&room("r2")).is_none());
    assert_eq!(reg.room_count(), 1);
    assert_eq!(shuffles.load(Ordering::SeqCst), 1);
}

#[test]
fn test_try_join_rejects_rejoining_same_room() {
    let (mut reg, _) = registry();
    reg.try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();

    let err = reg
        .try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap_err();
    assert!(matches!(err, JoinError::AlreadySeated(_, _)));
    assert_eq!(reg.room(&room("r1")).unwrap().player_count(), 1);
}

#[test]
fn test_room_never_exceeds_capacity() {
    let (mut reg, _) = registry();
    for id in 1..=10 {
        let _ = reg.try_join(
            room("r1"),
            player(id, &format!("p{id}")),
            dummy_sink(),
        );
        assert!(reg.room(&room("r1")).unwrap().player_count() <= 2);
    }
}

#[test]
fn test_open_room_ids_lists_only_single_seat_rooms() {
    let (mut reg, _) = registry();

    // r1: one player (open). r2: two players (full).
    reg.try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();
    reg.try_join(room("r2"), player(2, "Bob"), dummy_sink())
        .unwrap();
    reg.try_join(room("r2"), player(3, "Carol"), dummy_sink())
        .unwrap();

    let open = reg.open_room_ids();
    assert_eq!(open, vec![room("r1")]);
}

#[test]
fn test_room_of_tracks_membership() {
    let (mut reg, _) = registry();
    assert!(reg.room_of(conn(1)).is_none());

    reg.try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();
    assert_eq!(reg.room_of(conn(1)), Some(&room("r1")));
}

#[test]
fn test_leave_frees_seat_and_drops_empty_room() {
    let (mut reg, _) = registry();
    reg.try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();
    reg.try_join(room("r1"), player(2, "Bob"), dummy_sink())
        .unwrap();

    assert_eq!(reg.leave(conn(1)), Some(room("r1")));
    assert!(reg.room_of(conn(1)).is_none());
    assert_eq!(reg.room(&room("r1")).unwrap().player_count(), 1);

    // Last player out: the room disappears entirely.
    assert_eq!(reg.leave(conn(2)), Some(room("r1")));
    assert!(reg.room(&room("r1")).is_none());
    assert_eq!(reg.room_count(), 0);
}

#[test]
fn test_leave_unseated_connection_is_noop() {
    let (mut reg, _) = registry();
    assert_eq!(reg.leave(conn(9)), None);
}

#[test]
fn test_seat_freed_by_leave_can_be_retaken() {
    let (mut reg, shuffles) = registry();
    reg.try_join(room("r1"), player(1, "Alice"), dummy_sink())
        .unwrap();
    reg.try_join(room("r1"), player(2, "Bob"), dummy_sink())
        .unwrap();

    reg.leave(conn(2));
    let outcome = reg
        .try_join(room("r1"), player(3, "Carol"), dummy_sink())
        .unwrap();

    // The room survived with Alice in it, so no new deck was made.
    assert!(outcome.became_full);
    assert_eq!(shuffles.load(Ordering::SeqCst), 1);
}

// =========================================================================
// MatchmakingService tests
// =========================================================================

#[tokio::test]
async fn test_join_acknowledges_first_player_without_start() {
    let (matchmaking, _) = services();
    let (tx, mut rx) = mpsc::unbounded_channel();

    matchmaking.join(room("r1"), player(1, "Alice"), tx).await;

    assert_eq!(drain(&mut rx), vec![ServerEvent::RoomJoined]);
}

#[tokio::test]
async fn test_second_join_starts_game_with_crossed_symbols() {
    let (matchmaking, _) = services();
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();

    matchmaking.join(room("r1"), player(1, "Alice"), tx1).await;
    let _ = drain(&mut rx1);

    matchmaking.join(room("r1"), player(2, "Bob"), tx2).await;

    // The first joiner starts and sees the opponent's name.
    assert_eq!(
        drain(&mut rx1),
        vec![ServerEvent::StartGame {
            start: true,
            symbol: "Bob".into()
        }]
    );
    // The second joiner is acknowledged, then told not to start.
    assert_eq!(
        drain(&mut rx2),
        vec![
            ServerEvent::RoomJoined,
            ServerEvent::StartGame {
                start: false,
                symbol: "Alice".into()
            },
        ]
    );
}

#[tokio::test]
async fn test_rejected_join_gets_fixed_error_message() {
    let (matchmaking, _) = services();
    let (tx1, _rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    let (tx3, mut rx3) = mpsc::unbounded_channel();

    matchmaking.join(room("r1"), player(1, "Alice"), tx1).await;
    matchmaking.join(room("r1"), player(2, "Bob"), tx2).await;
    matchmaking.join(room("r1"), player(3, "Carol"), tx3).await;

    assert_eq!(
        drain(&mut rx3),
        vec![ServerEvent::RoomJoinError {
            error: JOIN_REJECTED.into()
        }]
    );
}

#[tokio::test]
async fn test_already_seated_join_uses_same_error_message() {
    let (matchmaking, _) = services();
    let (tx1, mut rx1) = mpsc::unbounded_channel();

    matchmaking
        .join(room("r1"), player(1, "Alice"), tx1.clone())
        .await;
    let _ = drain(&mut rx1);

    matchmaking.join(room("r2"), player(1, "Alice"), tx1).await;

    // Identical wording — the client cannot tell the two cases apart.
    assert_eq!(
        drain(&mut rx1),
        vec![ServerEvent::RoomJoinError {
            error: JOIN_REJECTED.into()
        }]
    );
    assert!(matchmaking.open_rooms().await.contains(&room("r1")));
    assert!(!matchmaking.open_rooms().await.contains(&room("r2")));
}

#[tokio::test]
async fn test_open_rooms_follows_fill_state() {
    let (matchmaking, _) = services();
    let (tx1, _rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();

    assert!(matchmaking.open_rooms().await.is_empty());

    matchmaking.join(room("r1"), player(1, "Alice"), tx1).await;
    assert_eq!(matchmaking.open_rooms().await, vec![room("r1")]);

    matchmaking.join(room("r1"), player(2, "Bob"), tx2).await;
    assert!(matchmaking.open_rooms().await.is_empty());
}

// =========================================================================
// EventBroadcaster tests
// =========================================================================

/// Seats Alice (conn 1) and Bob (conn 2) in `"r1"` and returns both
/// receivers, drained past the join traffic.
async fn seated_pair() -> (
    MatchmakingService<CountingDeck>,
    EventBroadcaster<CountingDeck>,
    mpsc::UnboundedReceiver<ServerEvent>,
    mpsc::UnboundedReceiver<ServerEvent>,
) {
    let (matchmaking, broadcaster) = services();
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();

    matchmaking.join(room("r1"), player(1, "Alice"), tx1).await;
    matchmaking.join(room("r1"), player(2, "Bob"), tx2).await;
    let _ = drain(&mut rx1);
    let _ = drain(&mut rx2);

    (matchmaking, broadcaster, rx1, rx2)
}

#[tokio::test]
async fn test_broadcast_reaches_peer_not_sender() {
    let (_m, broadcaster, mut rx1, mut rx2) = seated_pair().await;

    broadcaster
        .broadcast(conn(1), ServerEvent::OnActionMessageUpdate(json!("hi")))
        .await;

    assert!(drain(&mut rx1).is_empty(), "sender must not receive");
    assert_eq!(
        drain(&mut rx2),
        vec![ServerEvent::OnActionMessageUpdate(json!("hi"))]
    );
}

#[tokio::test]
async fn test_game_update_fans_out_four_events_in_order() {
    let (_m, broadcaster, mut rx1, mut rx2) = seated_pair().await;

    let payload = json!({
        "currentPlayer": "Bob",
        "remainingCards": 30,
        "activeSuit": "Hearts",
        "lastMove": "8 of Spades",
    });
    broadcaster.relay_game_update(conn(1), payload.clone()).await;

    assert!(drain(&mut rx1).is_empty());
    assert_eq!(
        drain(&mut rx2),
        vec![
            ServerEvent::OnGameUpdate(payload),
            ServerEvent::OnCurrentPlayerUpdate(json!("Bob")),
            ServerEvent::OnRemainingCardsUpdate(json!(30)),
            ServerEvent::OnActiveSuitUpdate(json!("Hearts")),
        ]
    );
}

#[tokio::test]
async fn test_game_update_projects_missing_fields_as_null() {
    let (_m, broadcaster, _rx1, mut rx2) = seated_pair().await;

    let payload = json!({ "remainingCards": 12 });
    broadcaster.relay_game_update(conn(1), payload.clone()).await;

    assert_eq!(
        drain(&mut rx2),
        vec![
            ServerEvent::OnGameUpdate(payload),
            ServerEvent::OnCurrentPlayerUpdate(Value::Null),
            ServerEvent::OnRemainingCardsUpdate(json!(12)),
            ServerEvent::OnActiveSuitUpdate(Value::Null),
        ]
    );
}

#[tokio::test]
async fn test_action_message_forwards_message_field_only() {
    let (_m, broadcaster, _rx1, mut rx2) = seated_pair().await;

    broadcaster
        .relay_action_message(
            conn(1),
            json!({ "message": "skip!", "noise": true }),
        )
        .await;

    assert_eq!(
        drain(&mut rx2),
        vec![ServerEvent::OnActionMessageUpdate(json!("skip!"))]
    );
}

#[tokio::test]
async fn test_broadcast_from_unseated_connection_is_silent_noop() {
    let (_m, broadcaster, mut rx1, mut rx2) = seated_pair().await;

    broadcaster
        .relay_game_update(conn(99), json!({ "currentPlayer": "X" }))
        .await;

    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
}

#[tokio::test]
async fn test_room_of_resolves_seated_connections_only() {
    let (_m, broadcaster, _rx1, _rx2) = seated_pair().await;

    assert_eq!(broadcaster.room_of(conn(1)).await, Some(room("r1")));
    assert_eq!(broadcaster.room_of(conn(2)).await, Some(room("r1")));
    assert_eq!(broadcaster.room_of(conn(99)).await, None);
}

// =========================================================================
// Concurrency: racing joins for the last seat
// =========================================================================

#[tokio::test]
async fn test_concurrent_joins_never_overfill_a_room() {
    let (reg, _) = registry();
    let shared = Arc::new(Mutex::new(reg));
    let matchmaking = Arc::new(MatchmakingService::new(Arc::clone(&shared)));

    matchmaking
        .join(room("r1"), player(100, "Host"), dummy_sink())
        .await;

    // Ten connections race for the one remaining seat.
    let mut receivers = Vec::new();
    let mut handles = Vec::new();
    for id in 1..=10 {
        let (tx, rx) = mpsc::unbounded_channel();
        receivers.push(rx);
        let matchmaking = Arc::clone(&matchmaking);
        handles.push(tokio::spawn(async move {
            matchmaking
                .join(room("r1"), player(id, &format!("p{id}")), tx)
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for rx in &mut receivers {
        match drain(rx).first() {
            Some(ServerEvent::RoomJoined) => admitted += 1,
            Some(ServerEvent::RoomJoinError { .. }) => rejected += 1,
            other => panic!("expected a join response, got {other:?}"),
        }
    }
    assert_eq!(admitted, 1, "exactly one racer wins the last seat");
    assert_eq!(rejected, 9);

    let reg = shared.lock().await;
    assert_eq!(reg.room(&room("r1")).unwrap().player_count(), 2);
}
