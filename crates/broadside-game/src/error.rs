//! Error types for the game layer.

use crate::Orientation;

/// Why a submitted fleet was rejected.
///
/// Recoverable: the message is sent back to the player as
/// `ships_validation_error` and the game keeps waiting for a fleet.
/// Ship numbers in messages are 1-based, as players count them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FleetError {
    #[error("Ships data must be an array")]
    NotAnArray,

    #[error(
        "Ship {ship} has invalid structure. Expected: {{ posX: number, posY: number, length: number, isHorizontal: boolean }}"
    )]
    Malformed { ship: usize },

    #[error("Ship {ship}: Ship coordinates out of bounds: ({x}, {y})")]
    OutOfBounds { ship: usize, x: i64, y: i64 },

    #[error(
        "Ship {ship}: Ship extends beyond board {}: position ({x}, {y}), length {length}",
        .orientation.adverb()
    )]
    OffBoard {
        ship: usize,
        x: i64,
        y: i64,
        length: i64,
        orientation: Orientation,
    },

    #[error("Expected {expected} ships, received {actual}")]
    WrongShipCount { expected: usize, actual: usize },

    #[error("Expected {expected} {name}(s) of length {length}, got {actual}")]
    Composition {
        name: &'static str,
        length: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Ship {ship} overlaps with another ship at position ({x},{y})")]
    Overlap { ship: usize, x: u8, y: u8 },
}

/// A request that doesn't fit the player's current state.
///
/// Non-fatal. The display text goes back to the player as an `error`
/// frame and nothing else changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Not in a game")]
    NotInGame,

    #[error("Already in a game")]
    AlreadyInGame,

    /// Both fleets are in and the battle has begun.
    #[error("Ships already placed")]
    FleetLocked,

    #[error("Game has not started")]
    NotStarted,

    #[error("Game is over")]
    Finished,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid attack coordinates: ({x}, {y})")]
    InvalidCoordinates { x: i32, y: i32 },
}
