//! Identity and player records.

use std::time::Instant;

use broadside_protocol::UserId;

/// A verified identity bound to one connection.
///
/// Immutable once bound: the registry hands out shared references only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// The registry's record of a connected player.
///
/// `C` is whatever handle the server uses to reach the connection. In the
/// server it is the sending half of the player's outbound channel; tests
/// use `()`.
///
/// Game state (opponent, turn flag, fleet) is not stored here. It lives
/// in the game session that owns the pairing.
#[derive(Debug)]
pub struct Player<C> {
    identity: Identity,
    connection: C,
    connected_at: Instant,
}

impl<C> Player<C> {
    pub(crate) fn new(identity: Identity, connection: C) -> Self {
        Self {
            identity,
            connection,
            connected_at: Instant::now(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    /// The handle used to deliver messages to this player.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }
}
