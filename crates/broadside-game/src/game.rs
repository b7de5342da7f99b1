//! One paired game, from pairing to the last shot.
//!
//! ```text
//! AwaitingFleets ──(both fleets accepted)──→ Playing ──(fleet sunk / forfeit)──→ Over
//! ```
//!
//! - **AwaitingFleets**: entered at pairing. The first turn is already
//!   decided but nobody may fire yet. Fleets may be resubmitted.
//! - **Playing**: fleets are locked in. The turn holder fires; a miss
//!   passes the turn, a hit keeps it.
//! - **Over**: terminal. The lobby tears the game down right after.

use std::fmt;
use std::time::{Duration, Instant};

use broadside_protocol::GameId;
use broadside_session::Identity;

use crate::{Coord, Fleet, GameError, Strike, resolve};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingFleets,
    Playing,
    Over,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingFleets => write!(f, "AwaitingFleets"),
            Self::Playing => write!(f, "Playing"),
            Self::Over => write!(f, "Over"),
        }
    }
}

/// Which of the two players. `First` is whoever triggered the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

#[derive(Debug)]
struct SeatState {
    identity: Identity,
    fleet: Option<Fleet>,
}

/// State of a single game between two players.
///
/// Players are referred to by [`Seat`]; the lobby maps usernames to
/// seats. Nothing here holds a reference to another player.
#[derive(Debug)]
pub struct GameSession {
    id: GameId,
    seats: [SeatState; 2],
    turn: Seat,
    phase: Phase,
    paired_at: Instant,
    battle_started_at: Option<Instant>,
}

impl GameSession {
    /// Creates a game in `AwaitingFleets` with the first turn pre-assigned.
    pub fn new(id: GameId, players: [Identity; 2], first_turn: Seat) -> Self {
        let [first, second] = players;
        Self {
            id,
            seats: [
                SeatState { identity: first, fleet: None },
                SeatState { identity: second, fleet: None },
            ],
            turn: first_turn,
            phase: Phase::AwaitingFleets,
            paired_at: Instant::now(),
            battle_started_at: None,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whose turn it is, or will be once the battle starts.
    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn identity(&self, seat: Seat) -> &Identity {
        &self.seats[seat.index()].identity
    }

    pub fn fleet(&self, seat: Seat) -> Option<&Fleet> {
        self.seats[seat.index()].fleet.as_ref()
    }

    /// The seat `username` occupies in this game, if any.
    pub fn seat_of(&self, username: &str) -> Option<Seat> {
        [Seat::First, Seat::Second]
            .into_iter()
            .find(|seat| self.identity(*seat).username == username)
    }

    pub fn battle_started_at(&self) -> Option<Instant> {
        self.battle_started_at
    }

    /// Time since the battle started, or since pairing if it never did.
    pub fn elapsed(&self) -> Duration {
        self.battle_started_at.unwrap_or(self.paired_at).elapsed()
    }

    /// Fails unless fleets may still be submitted.
    pub fn ensure_fleet_open(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::AwaitingFleets => Ok(()),
            Phase::Playing => Err(GameError::FleetLocked),
            Phase::Over => Err(GameError::Finished),
        }
    }

    /// Stores `seat`'s fleet, replacing any earlier submission.
    ///
    /// Returns `true` if this was the second fleet and the battle has now
    /// started.
    pub fn submit_fleet(&mut self, seat: Seat, fleet: Fleet) -> Result<bool, GameError> {
        self.ensure_fleet_open()?;
        self.seats[seat.index()].fleet = Some(fleet);

        if self.seats.iter().all(|s| s.fleet.is_some()) {
            self.phase = Phase::Playing;
            self.battle_started_at = Some(Instant::now());
            tracing::debug!(game_id = %self.id, "battle started");
            return Ok(true);
        }
        Ok(false)
    }

    /// Fails unless `seat` may fire right now.
    pub fn ensure_can_attack(&self, seat: Seat) -> Result<(), GameError> {
        match self.phase {
            Phase::AwaitingFleets => Err(GameError::NotStarted),
            Phase::Over => Err(GameError::Finished),
            Phase::Playing if self.turn != seat => Err(GameError::NotYourTurn),
            Phase::Playing => Ok(()),
        }
    }

    /// `seat` fires at `target` on the opponent's fleet.
    ///
    /// A miss passes the turn. Sinking the whole fleet ends the game.
    pub fn attack(&mut self, seat: Seat, target: Coord) -> Result<Strike, GameError> {
        self.ensure_can_attack(seat)?;

        let defender = &mut self.seats[seat.other().index()];
        let fleet = defender.fleet.as_mut().ok_or(GameError::NotStarted)?;
        let strike = resolve(fleet, target);

        if strike.fleet_sunk {
            self.phase = Phase::Over;
        } else if !strike.hit {
            self.turn = seat.other();
        }
        Ok(strike)
    }

    /// Ends the game without a shot, e.g. when a player leaves.
    pub fn forfeit(&mut self) {
        self.phase = Phase::Over;
    }
}
