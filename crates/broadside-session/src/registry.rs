//! The session registry: who is connected right now.
//!
//! Keyed by username. A username maps to at most one live [`Player`], which
//! is how the server enforces one connection per identity.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself. It is a plain `HashMap`
//! owned by the server's hub and reached only through the hub's mutex, the
//! same lock that guards the matchmaking queue. Registering and pairing can
//! therefore never interleave.

use std::collections::HashMap;

use crate::{AuthError, Identity, Player};

/// Tracks every connected player.
///
/// ```text
/// authenticate() ──→ register() ──→ ... ──→ unregister()
///                       │                       │
///                       ▼                       ▼
///                  [registered]            [gone; idempotent]
/// ```
pub struct SessionRegistry<C> {
    players: HashMap<String, Player<C>>,
}

impl<C> SessionRegistry<C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
        }
    }

    /// Binds `identity` to `connection`.
    ///
    /// # Errors
    /// Returns [`AuthError::AlreadyConnected`] if the username already has
    /// a live connection. The existing registration is left untouched.
    pub fn register(
        &mut self,
        identity: Identity,
        connection: C,
    ) -> Result<&Player<C>, AuthError> {
        use std::collections::hash_map::Entry;

        match self.players.entry(identity.username.clone()) {
            Entry::Occupied(_) => {
                Err(AuthError::AlreadyConnected(identity.username))
            }
            Entry::Vacant(slot) => {
                tracing::info!(
                    username = %identity.username,
                    user_id = %identity.user_id,
                    "player registered"
                );
                Ok(slot.insert(Player::new(identity, connection)))
            }
        }
    }

    /// Removes a player. Returns the removed record, or `None` if the
    /// username wasn't registered. Calling it twice is harmless.
    pub fn unregister(&mut self, username: &str) -> Option<Player<C>> {
        let removed = self.players.remove(username);
        if let Some(player) = &removed {
            tracing::info!(
                %username,
                online_secs = player.connected_at().elapsed().as_secs(),
                "player unregistered"
            );
        }
        removed
    }

    /// Looks up a connected player by username.
    pub fn lookup(&self, username: &str) -> Option<&Player<C>> {
        self.players.get(username)
    }

    /// Iterates over every connected player, in no particular order.
    pub fn players(&self) -> impl Iterator<Item = &Player<C>> {
        self.players.values()
    }

    /// Number of connected players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl<C> Default for SessionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
