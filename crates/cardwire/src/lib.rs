//! # Cardwire
//!
//! WebSocket relay backend for two-player card games.
//!
//! Cardwire seats pairs of connections into rooms, initializes one
//! shuffled deck per room through a [`DeckProvider`], and fans game
//! events out to room peers — never back to the sender. It does not
//! interpret the game: update payloads are client-reported and
//! forwarded as-is.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardwire::prelude::*;
//!
//! struct MyDeck;
//!
//! impl DeckProvider for MyDeck {
//!     type Deck = Vec<u8>;
//!     fn shuffled_deck(&self) -> Vec<u8> {
//!         vec![1, 2, 3] // your shuffle here
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CardwireError> {
//!     let server = CardwireServerBuilder::new()
//!         .bind("0.0.0.0:8080")
//!         .build(MyDeck)
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod router;
mod server;

pub use error::CardwireError;
pub use server::{CardwireServer, CardwireServerBuilder};

/// Everything an embedding application usually needs.
pub mod prelude {
    pub use crate::{CardwireError, CardwireServer, CardwireServerBuilder};
    pub use cardwire_protocol::{
        inbound, Codec, Envelope, JsonCodec, RoomId, ServerEvent,
    };
    pub use cardwire_room::{DeckProvider, Player, JOIN_REJECTED};
    pub use cardwire_transport::ConnectionId;
}
