//! Wire protocol for Cardwire.
//!
//! This crate defines the "language" that clients and the relay speak:
//!
//! - **Types** ([`Envelope`], [`ServerEvent`], [`RoomId`], the inbound
//!   payload structs) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures
//!   are converted to/from text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! # Wire shape
//!
//! Every frame is one JSON object with an `event` name and an optional
//! `data` payload:
//!
//! ```text
//! { "event": "join_game", "data": { "roomId": "r1", "user": { "username": "Alice" } } }
//! { "event": "start_game", "data": { "start": true, "symbol": "Bob" } }
//! { "event": "room_joined" }
//! ```
//!
//! Inbound frames are decoded as a raw [`Envelope`] so the gateway can
//! route on the event name before any payload typing happens; outbound
//! frames are produced directly from the [`ServerEvent`] enum, whose
//! serde tagging yields exactly this shape.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    inbound, Envelope, JoinGamePayload, RoomId, ServerEvent, UserProfile,
};
