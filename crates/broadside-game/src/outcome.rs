//! What a lobby operation wants done once it returns.
//!
//! Lobby operations never do I/O. They return an [`Outcome`] listing the
//! messages to deliver and the persistence work to start, and the server
//! carries them out.

use std::time::Duration;

use broadside_protocol::{GameId, Recipient, ServerMessage, UserId};

/// A request for the durable game record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRequest {
    /// Two players were paired. Seats are in pairing order.
    Open { game: GameId, players: [UserId; 2] },

    /// A fleet was sunk.
    Complete {
        game: GameId,
        winner: UserId,
        loser: UserId,
        duration: Duration,
    },

    /// A player disconnected mid-game.
    Abandon { game: GameId },
}

impl RecordRequest {
    pub fn game(&self) -> GameId {
        match self {
            Self::Open { game, .. }
            | Self::Complete { game, .. }
            | Self::Abandon { game } => *game,
        }
    }
}

/// Effects of one lobby operation, in the order they must happen.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub messages: Vec<(Recipient, ServerMessage)>,
    pub records: Vec<RecordRequest>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message for one player.
    pub fn send(&mut self, username: &str, msg: ServerMessage) {
        self.messages.push((Recipient::player(username), msg));
    }

    /// Queues a message for every connected player.
    pub fn broadcast(&mut self, msg: ServerMessage) {
        self.messages.push((Recipient::All, msg));
    }

    pub fn record(&mut self, request: RecordRequest) {
        self.records.push(request);
    }

    /// Messages addressed to `username` (broadcasts excluded), in order.
    pub fn messages_for<'a>(
        &'a self,
        username: &'a str,
    ) -> impl Iterator<Item = &'a ServerMessage> + 'a {
        self.messages.iter().filter_map(move |(to, msg)| match to {
            Recipient::Player(name) if name == username => Some(msg),
            _ => None,
        })
    }

    /// Broadcast messages, in order.
    pub fn broadcasts(&self) -> impl Iterator<Item = &ServerMessage> + '_ {
        self.messages.iter().filter_map(|(to, msg)| match to {
            Recipient::All => Some(msg),
            Recipient::Player(_) => None,
        })
    }
}
