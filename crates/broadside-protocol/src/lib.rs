//! Wire protocol for Broadside.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Recipient`], etc.)
//!   — the messages that travel on the wire as JSON text frames.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Game (Lobby)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    AttackResult, ClientMessage, DestroyedShip, GameId, Recipient,
    ServerMessage, UserId,
};
