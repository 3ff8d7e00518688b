use std::collections::BTreeSet;

use super::unit::Position;

/// Static battlefield geometry consulted by range calculation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    /// Impassable tiles. Attacks cannot land on them.
    pub blocked: BTreeSet<Position>,
}

impl MapData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blocked: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_blocked(mut self, tiles: impl IntoIterator<Item = Position>) -> Self {
        self.blocked.extend(tiles);
        self
    }

    pub fn contains(&self, position: &Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    pub fn is_targetable(&self, position: &Position) -> bool {
        self.contains(position) && !self.blocked.contains(position)
    }
}
