//! Attack range computation seam and grid implementation.

use crate::state::{MapData, Position, RangeShape, Unit, Weapon};

/// Computes the set of tiles a weapon can reach from a unit's position.
pub trait RangeCalculator: Send + Sync {
    /// Returns the reachable tiles in a stable order.
    fn attack_range(&self, attacker: &Unit, weapon: &Weapon, map: Option<&MapData>)
    -> Vec<Position>;
}

/// Pattern-based range on a square grid.
///
/// Ignores line of sight; blocked tiles and tiles outside the map are
/// excluded when a map is provided.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridRangeCalculator;

impl GridRangeCalculator {
    fn in_pattern(shape: RangeShape, dx: i32, dy: i32, min: u32, max: u32) -> bool {
        let manhattan = dx.unsigned_abs() + dy.unsigned_abs();
        let chebyshev = dx.unsigned_abs().max(dy.unsigned_abs());
        match shape {
            RangeShape::Diamond => (min..=max).contains(&manhattan),
            RangeShape::Cross => (dx == 0 || dy == 0) && (min..=max).contains(&manhattan),
            RangeShape::Square => (min..=max).contains(&chebyshev),
        }
    }
}

impl RangeCalculator for GridRangeCalculator {
    fn attack_range(
        &self,
        attacker: &Unit,
        weapon: &Weapon,
        map: Option<&MapData>,
    ) -> Vec<Position> {
        let pattern = weapon.range;
        let reach = i32::try_from(pattern.max).unwrap_or(i32::MAX);
        let origin = attacker.position;

        let mut tiles = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if !Self::in_pattern(pattern.shape, dx, dy, pattern.min, pattern.max) {
                    continue;
                }
                // tiles past the coordinate limits do not exist
                let (Some(x), Some(y)) = (origin.x.checked_add(dx), origin.y.checked_add(dy))
                else {
                    continue;
                };
                let tile = Position::new(x, y);
                if map.is_none_or(|m| m.is_targetable(&tile)) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }
}
