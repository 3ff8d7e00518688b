//! Target enumeration and selection seam.

use std::collections::BTreeSet;

use crate::error::BattleError;
use crate::state::{Faction, MapData, Position, Unit, UnitId, Weapon};

/// Inputs used to (re)initialize a target selector.
#[derive(Clone, Copy, Debug)]
pub struct TargetingContext<'a> {
    pub attacker: &'a Unit,
    pub weapon: &'a Weapon,
    pub units: &'a [Unit],
    pub map: Option<&'a MapData>,
    /// Tiles produced by the range calculator for this attacker and weapon.
    pub attack_range: &'a [Position],
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target selection has not been initialized")]
    NotInitialized,

    #[error("unit {0} is not hostile to the attacker")]
    NotHostile(UnitId),

    #[error("unit {0} is already defeated")]
    Defeated(UnitId),

    #[error("unit {0} is outside the attack range")]
    OutOfRange(UnitId),
}

impl From<TargetError> for BattleError {
    fn from(err: TargetError) -> Self {
        let message = err.to_string();
        match err {
            TargetError::NotInitialized => BattleError::system(message),
            TargetError::NotHostile(_) | TargetError::Defeated(_) => {
                BattleError::invalid_target(message)
            }
            TargetError::OutOfRange(_) => BattleError::out_of_range(message),
        }
    }
}

/// Candidate enumeration and cursor state for one attack.
pub trait TargetSelector: Send + Sync {
    /// Replaces any previous state with candidates for a new attack.
    fn initialize(&mut self, ctx: &TargetingContext<'_>);

    /// Valid candidates in roster order.
    fn valid_targets(&self) -> &[UnitId];

    /// Validates and records the chosen target.
    fn select(&mut self, target: &Unit) -> Result<(), TargetError>;

    fn selected(&self) -> Option<UnitId>;

    /// Drops all state. Safe to call when not initialized.
    fn clear(&mut self);
}

#[derive(Clone, Debug)]
struct Session {
    attacker: UnitId,
    faction: Faction,
    range: BTreeSet<Position>,
    candidates: Vec<UnitId>,
    selected: Option<UnitId>,
}

/// Targets every living hostile unit standing inside the attack range.
#[derive(Clone, Debug, Default)]
pub struct BasicTargetSelector {
    session: Option<Session>,
}

impl BasicTargetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }
}

impl TargetSelector for BasicTargetSelector {
    fn initialize(&mut self, ctx: &TargetingContext<'_>) {
        let range: BTreeSet<Position> = ctx.attack_range.iter().copied().collect();
        let candidates = ctx
            .units
            .iter()
            .filter(|u| {
                u.is_alive() && ctx.attacker.is_hostile_to(u) && range.contains(&u.position)
            })
            .map(|u| u.id)
            .collect();

        self.session = Some(Session {
            attacker: ctx.attacker.id,
            faction: ctx.attacker.faction,
            range,
            candidates,
            selected: None,
        });
    }

    fn valid_targets(&self) -> &[UnitId] {
        self.session
            .as_ref()
            .map(|s| s.candidates.as_slice())
            .unwrap_or(&[])
    }

    fn select(&mut self, target: &Unit) -> Result<(), TargetError> {
        let session = self.session.as_mut().ok_or(TargetError::NotInitialized)?;

        if target.id == session.attacker || !session.faction.is_hostile_to(target.faction) {
            return Err(TargetError::NotHostile(target.id));
        }
        if !target.is_alive() {
            return Err(TargetError::Defeated(target.id));
        }
        if !session.range.contains(&target.position) {
            return Err(TargetError::OutOfRange(target.id));
        }

        session.selected = Some(target.id);
        Ok(())
    }

    fn selected(&self) -> Option<UnitId> {
        self.session.as_ref().and_then(|s| s.selected)
    }

    fn clear(&mut self) {
        self.session = None;
    }
}
