//! Grid coordinates and ships.

use std::collections::HashSet;
use std::fmt;

use broadside_protocol::DestroyedShip;

/// Width and height of the square board.
pub const BOARD_SIZE: u8 = 10;

/// A cell on the board. Both axes run `0..BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    /// Returns the cell at `(x, y)`, or `None` if it's off the board.
    pub fn new(x: i64, y: i64) -> Option<Self> {
        let size = i64::from(BOARD_SIZE);
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Some(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn from_horizontal(is_horizontal: bool) -> Self {
        if is_horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }

    /// "horizontally" or "vertically", for error messages.
    pub fn adverb(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontally",
            Self::Vertical => "vertically",
        }
    }
}

/// A ship placed on the board, plus the cells that have been hit.
///
/// A ship covers `length` cells starting at `origin` and running right
/// (horizontal) or down (vertical).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    origin: Coord,
    length: u8,
    orientation: Orientation,
    hits: HashSet<Coord>,
}

impl Ship {
    /// Creates an undamaged ship. Placement rules are the fleet
    /// validator's job, not this constructor's.
    pub fn new(origin: Coord, length: u8, orientation: Orientation) -> Self {
        Self {
            origin,
            length,
            orientation,
            hits: HashSet::new(),
        }
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The cells this ship covers, from the origin outwards.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.length).map(move |i| match self.orientation {
            Orientation::Horizontal => Coord {
                x: self.origin.x + i,
                y: self.origin.y,
            },
            Orientation::Vertical => Coord {
                x: self.origin.x,
                y: self.origin.y + i,
            },
        })
    }

    /// Returns `true` if `cell` lies on this ship's line.
    pub fn occupies(&self, cell: Coord) -> bool {
        let (along, across, origin_along, origin_across) =
            match self.orientation {
                Orientation::Horizontal => {
                    (cell.x, cell.y, self.origin.x, self.origin.y)
                }
                Orientation::Vertical => {
                    (cell.y, cell.x, self.origin.y, self.origin.x)
                }
            };
        across == origin_across
            && along >= origin_along
            && along - origin_along < self.length
    }

    /// Records a hit. Returns `false` if the cell was already hit.
    pub(crate) fn record_hit(&mut self, cell: Coord) -> bool {
        self.hits.insert(cell)
    }

    /// Number of distinct cells hit so far.
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    pub fn is_sunk(&self) -> bool {
        self.hits.len() == usize::from(self.length)
    }

    /// The `ship_destroyed` payload for this ship at fleet index `id`.
    pub fn to_wire(&self, id: usize) -> DestroyedShip {
        DestroyedShip {
            id,
            pos_x: self.origin.x,
            pos_y: self.origin.y,
            length: self.length,
            is_horizontal: self.orientation.is_horizontal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: u8, y: u8) -> Coord {
        Coord { x, y }
    }

    #[test]
    fn test_coord_new_rejects_off_board() {
        assert_eq!(Coord::new(0, 9), Some(at(0, 9)));
        assert_eq!(Coord::new(10, 0), None);
        assert_eq!(Coord::new(-1, 3), None);
    }

    #[test]
    fn test_cells_horizontal_runs_along_x() {
        let ship = Ship::new(at(2, 7), 3, Orientation::Horizontal);
        let cells: Vec<_> = ship.cells().collect();
        assert_eq!(cells, [at(2, 7), at(3, 7), at(4, 7)]);
    }

    #[test]
    fn test_cells_vertical_runs_along_y() {
        let ship = Ship::new(at(5, 0), 2, Orientation::Vertical);
        let cells: Vec<_> = ship.cells().collect();
        assert_eq!(cells, [at(5, 0), at(5, 1)]);
    }

    #[test]
    fn test_occupies_matches_cells() {
        let ship = Ship::new(at(1, 1), 4, Orientation::Vertical);
        for x in 0..BOARD_SIZE {
            for y in 0..BOARD_SIZE {
                let cell = at(x, y);
                assert_eq!(
                    ship.occupies(cell),
                    ship.cells().any(|c| c == cell),
                    "disagreement at {cell}"
                );
            }
        }
    }

    #[test]
    fn test_record_hit_is_idempotent() {
        let mut ship = Ship::new(at(0, 0), 2, Orientation::Horizontal);
        assert!(ship.record_hit(at(0, 0)));
        assert!(!ship.record_hit(at(0, 0)));
        assert_eq!(ship.hit_count(), 1);
        assert!(!ship.is_sunk());

        ship.record_hit(at(1, 0));
        assert!(ship.is_sunk());
    }

    #[test]
    fn test_to_wire() {
        let ship = Ship::new(at(3, 4), 5, Orientation::Horizontal);
        let wire = ship.to_wire(0);
        assert_eq!(wire.pos_x, 3);
        assert_eq!(wire.pos_y, 4);
        assert_eq!(wire.length, 5);
        assert!(wire.is_horizontal);
    }
}
