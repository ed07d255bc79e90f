//! The `DeckProvider` trait — the seam to the shuffling algorithm.
//!
//! The relay never looks inside a deck. It asks the provider for a
//! shuffled deck exactly once, when a room is created for its first
//! joiner, stores the result on the room, and leaves it alone until the
//! room is dropped.

/// Produces a shuffled deck state on demand.
///
/// Implemented by the embedding application; the demo ships a plain
/// 52-card provider. The associated `Deck` type is fully opaque to the
/// room layer — it only has to be sendable across tasks.
pub trait DeckProvider: Send + Sync + 'static {
    /// The deck state stored on each room.
    type Deck: Send + Sync + 'static;

    /// Returns a freshly shuffled deck for a new room.
    fn shuffled_deck(&self) -> Self::Deck;
}
