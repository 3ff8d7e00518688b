use super::unit::{Faction, Unit, UnitId};

/// Ordered collection of every unit taking part in the battle.
///
/// Insertion order is preserved so that iteration (and therefore target
/// enumeration) is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    units: Vec<Unit>,
}

impl Roster {
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn as_slice(&self) -> &[Unit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// Living units of the given faction.
    pub fn alive_in(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |u| u.faction == faction && u.is_alive())
    }

    /// Clears the per-turn action flags of every unit in `faction`.
    pub fn reset_turn_flags(&mut self, faction: Faction) {
        for unit in self.units.iter_mut().filter(|u| u.faction == faction) {
            unit.has_acted = false;
            unit.has_moved = false;
        }
    }
}

impl FromIterator<Unit> for Roster {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
