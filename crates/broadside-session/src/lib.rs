//! Player identity and session registry for Broadside.
//!
//! This crate handles the lifecycle of a player connection:
//!
//! 1. **Authentication** — turning a bearer token into an [`Identity`]
//!    ([`IdentityVerifier`], [`UserDirectory`], [`authenticate`])
//! 2. **Registration** — knowing who's connected, at most once per
//!    identity ([`SessionRegistry`])
//!
//! There is no reconnection: when a connection closes the player is
//! unregistered and any game they were in is forfeited.
//!
//! ```text
//! Game Layer (above)  ← looks players up by username
//!     ↕
//! Session Layer (this crate)  ← identity and connection records
//!     ↕
//! Protocol Layer (below)  ← provides UserId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod player;
mod registry;

pub use auth::{Claims, IdentityVerifier, UserDirectory, UserRecord, authenticate};
pub use error::AuthError;
pub use player::{Identity, Player};
pub use registry::SessionRegistry;
