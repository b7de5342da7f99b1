//! Fleet validation.
//!
//! A fleet arrives as raw JSON and goes through two stages:
//!
//! 1. **Parse** — every element must be an object with integral `posX`,
//!    `posY`, `length` and a boolean `isHorizontal`. Every ship is parsed
//!    before any rule runs, so malformed input never reaches the checks.
//! 2. **Rules**, in order, first failure wins:
//!    per-ship bounds and fit (ship by ship), fleet composition, overlap.
//!
//! Only a fully valid fleet ever becomes a [`Fleet`].

use std::collections::HashSet;

use serde_json::Value;

use crate::{BOARD_SIZE, Coord, FleetError, Orientation, Ship};

/// One ship class in the required fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipClass {
    pub name: &'static str,
    pub length: u8,
    pub count: usize,
}

/// The fleet every player must field: lengths {5, 4, 3, 3, 2}.
pub const FLEET_COMPOSITION: [ShipClass; 4] = [
    ShipClass { name: "Carrier", length: 5, count: 1 },
    ShipClass { name: "Battleship", length: 4, count: 1 },
    ShipClass { name: "Cruiser/Submarine", length: 3, count: 2 },
    ShipClass { name: "Destroyer", length: 2, count: 1 },
];

/// Number of ships in a fleet.
pub const FLEET_SIZE: usize = 5;

/// A validated fleet, in the order the player submitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    /// Wraps ships without validating them. Crate-internal so the only
    /// public way to get a `Fleet` is [`validate_fleet`].
    pub(crate) fn from_ships(ships: Vec<Ship>) -> Self {
        Self { ships }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub(crate) fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }

    /// `true` once every ship is sunk.
    pub fn is_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }
}

/// A ship that parsed but hasn't been checked against the rules.
#[derive(Debug, Clone, Copy)]
struct RawShip {
    x: i64,
    y: i64,
    length: i64,
    orientation: Orientation,
}

/// Validates a submitted fleet.
///
/// # Errors
/// The first [`FleetError`] found; see the module docs for the order.
pub fn validate_fleet(raw: &Value) -> Result<Fleet, FleetError> {
    let parsed = parse_ships(raw)?;

    let mut origins = Vec::with_capacity(parsed.len());
    for (index, ship) in parsed.iter().enumerate() {
        origins.push(check_placement(index + 1, ship)?);
    }

    check_composition(&parsed)?;

    // Bounds, fit and composition passed, so every length is 2..=5 and
    // every ship lies on the board.
    let ships: Vec<Ship> = parsed
        .iter()
        .zip(origins)
        .map(|(raw, origin)| Ship::new(origin, raw.length as u8, raw.orientation))
        .collect();

    check_overlaps(&ships)?;

    Ok(Fleet::from_ships(ships))
}

fn parse_ships(raw: &Value) -> Result<Vec<RawShip>, FleetError> {
    let elements = raw.as_array().ok_or(FleetError::NotAnArray)?;

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            parse_ship(element).ok_or(FleetError::Malformed { ship: index + 1 })
        })
        .collect()
}

fn parse_ship(element: &Value) -> Option<RawShip> {
    let obj = element.as_object()?;
    Some(RawShip {
        x: obj.get("posX")?.as_i64()?,
        y: obj.get("posY")?.as_i64()?,
        length: obj.get("length")?.as_i64()?,
        orientation: Orientation::from_horizontal(
            obj.get("isHorizontal")?.as_bool()?,
        ),
    })
}

/// Bounds then fit for one ship. `ship` is the 1-based position.
fn check_placement(ship: usize, raw: &RawShip) -> Result<Coord, FleetError> {
    let origin = Coord::new(raw.x, raw.y).ok_or(FleetError::OutOfBounds {
        ship,
        x: raw.x,
        y: raw.y,
    })?;

    let start = match raw.orientation {
        Orientation::Horizontal => raw.x,
        Orientation::Vertical => raw.y,
    };
    if start.saturating_add(raw.length) > i64::from(BOARD_SIZE) {
        return Err(FleetError::OffBoard {
            ship,
            x: raw.x,
            y: raw.y,
            length: raw.length,
            orientation: raw.orientation,
        });
    }

    Ok(origin)
}

fn check_composition(ships: &[RawShip]) -> Result<(), FleetError> {
    if ships.len() != FLEET_SIZE {
        return Err(FleetError::WrongShipCount {
            expected: FLEET_SIZE,
            actual: ships.len(),
        });
    }

    for class in FLEET_COMPOSITION {
        let actual = ships
            .iter()
            .filter(|s| s.length == i64::from(class.length))
            .count();
        if actual != class.count {
            return Err(FleetError::Composition {
                name: class.name,
                length: class.length,
                expected: class.count,
                actual,
            });
        }
    }

    Ok(())
}

fn check_overlaps(ships: &[Ship]) -> Result<(), FleetError> {
    let mut occupied = HashSet::new();
    for (index, ship) in ships.iter().enumerate() {
        for cell in ship.cells() {
            if !occupied.insert(cell) {
                return Err(FleetError::Overlap {
                    ship: index + 1,
                    x: cell.x,
                    y: cell.y,
                });
            }
        }
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
