//! Game rules and matchmaking for Broadside.
//!
//! Everything in this crate is synchronous and does no I/O. The server
//! calls into the [`Lobby`] while holding its lock and then delivers the
//! returned [`Outcome`].
//!
//! # Key types
//!
//! - [`validate_fleet`] — turns a submitted JSON fleet into a [`Fleet`]
//! - [`resolve`] — applies one shot to a fleet, yielding a [`Strike`]
//! - [`GameSession`] — one game's state machine ([`Phase`])
//! - [`Lobby`] — waiting slot, live games, public counters
//! - [`Outcome`] / [`RecordRequest`] — effects for the server to carry out

mod attack;
mod error;
mod fleet;
mod game;
mod lobby;
mod outcome;
mod ship;

pub use attack::{Strike, resolve};
pub use error::{FleetError, GameError};
pub use fleet::{FLEET_COMPOSITION, FLEET_SIZE, Fleet, ShipClass, validate_fleet};
pub use game::{GameSession, Phase, Seat};
pub use lobby::Lobby;
pub use outcome::{Outcome, RecordRequest};
pub use ship::{BOARD_SIZE, Coord, Orientation, Ship};
