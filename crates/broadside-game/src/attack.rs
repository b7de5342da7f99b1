//! Resolving a single strike against a fleet.

use crate::{Coord, Fleet};

/// What one attack did to the defending fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub hit: bool,
    /// Fleet index of the ship this strike finished off. Only the strike
    /// that completes a ship reports it; later hits on a wreck don't.
    pub sunk: Option<usize>,
    /// Every ship in the fleet is now sunk.
    pub fleet_sunk: bool,
}

/// Fires at `target` and records the damage on `fleet`.
///
/// Ships are scanned in fleet order and the first ship covering the cell
/// takes the hit. Hitting the same cell twice still reports a hit but
/// doesn't count twice toward sinking.
pub fn resolve(fleet: &mut Fleet, target: Coord) -> Strike {
    let mut hit = false;
    let mut sunk = None;

    if let Some((index, ship)) = fleet
        .ships_mut()
        .iter_mut()
        .enumerate()
        .find(|(_, ship)| ship.occupies(target))
    {
        hit = true;
        let was_sunk = ship.is_sunk();
        ship.record_hit(target);
        if !was_sunk && ship.is_sunk() {
            sunk = Some(index);
        }
    }

    Strike {
        hit,
        sunk,
        fleet_sunk: fleet.is_sunk(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Orientation, Ship};

    fn at(x: u8, y: u8) -> Coord {
        Coord { x, y }
    }

    fn single_ship_fleet() -> Fleet {
        Fleet::from_ships(vec![Ship::new(at(0, 0), 3, Orientation::Horizontal)])
    }

    #[test]
    fn test_resolve_sinks_single_ship_in_three_hits() {
        let mut fleet = single_ship_fleet();

        let first = resolve(&mut fleet, at(0, 0));
        assert_eq!(first, Strike { hit: true, sunk: None, fleet_sunk: false });

        let second = resolve(&mut fleet, at(1, 0));
        assert_eq!(second, Strike { hit: true, sunk: None, fleet_sunk: false });

        let third = resolve(&mut fleet, at(2, 0));
        assert_eq!(third, Strike { hit: true, sunk: Some(0), fleet_sunk: true });
    }

    #[test]
    fn test_resolve_miss_changes_nothing() {
        let mut fleet = single_ship_fleet();
        let strike = resolve(&mut fleet, at(0, 1));
        assert_eq!(strike, Strike { hit: false, sunk: None, fleet_sunk: false });
        assert_eq!(fleet.ships()[0].hit_count(), 0);
    }

    #[test]
    fn test_resolve_repeat_hit_reports_hit_without_double_counting() {
        let mut fleet = single_ship_fleet();
        resolve(&mut fleet, at(1, 0));
        let again = resolve(&mut fleet, at(1, 0));

        assert!(again.hit);
        assert_eq!(again.sunk, None);
        assert_eq!(fleet.ships()[0].hit_count(), 1);
    }

    #[test]
    fn test_resolve_hit_on_wreck_does_not_report_sinking_again() {
        let mut fleet = single_ship_fleet();
        for x in 0..3 {
            resolve(&mut fleet, at(x, 0));
        }
        let after = resolve(&mut fleet, at(2, 0));
        assert_eq!(after, Strike { hit: true, sunk: None, fleet_sunk: true });
    }

    #[test]
    fn test_resolve_reports_index_of_sunk_ship() {
        let mut fleet = Fleet::from_ships(vec![
            Ship::new(at(0, 0), 3, Orientation::Horizontal),
            Ship::new(at(5, 5), 2, Orientation::Vertical),
        ]);

        resolve(&mut fleet, at(5, 5));
        let strike = resolve(&mut fleet, at(5, 6));
        assert_eq!(strike, Strike { hit: true, sunk: Some(1), fleet_sunk: false });
    }
}
