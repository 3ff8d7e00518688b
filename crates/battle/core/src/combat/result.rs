//! The authoritative record of one combat exchange.

use crate::state::{UnitId, Weapon};

use super::damage::DamageOutcome;
use super::modifier::Modifier;

/// Effect merged into a result by the orchestrator or an integration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum AppliedEffect {
    /// Free-form effect contributed by the job integration.
    JobEffect { name: String },
    /// The defeated target was converted to an NPC.
    Recruited { unit: UnitId },
    CharacterLost { unit: UnitId },
    BossDefeated { boss: UnitId, rose_essence: u32 },
    LevelUp { unit: UnitId, new_level: u32 },
    Status { unit: UnitId, name: String },
    Heal { unit: UnitId, amount: u32 },
}

/// Outcome of one attacker → target exchange.
///
/// Created once per exchange, enriched step by step (job post-processing,
/// recruitment, experience) and frozen once pushed to history.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResult {
    pub attacker: UnitId,
    pub target: UnitId,
    /// Weapon as used, after job modification.
    pub weapon: Weapon,
    pub base_damage: u32,
    pub final_damage: u32,
    /// Modifiers in application order.
    pub modifiers: Vec<Modifier>,
    pub is_critical: bool,
    pub is_evaded: bool,
    pub experience_gained: u32,
    pub target_defeated: bool,
    pub effects: Vec<AppliedEffect>,
    /// Milliseconds since the Unix epoch, stamped by the runtime.
    pub timestamp: u64,
}

impl BattleResult {
    /// Builds the initial result from a damage outcome.
    pub fn from_outcome(
        attacker: UnitId,
        target: UnitId,
        weapon: Weapon,
        outcome: DamageOutcome,
        timestamp: u64,
    ) -> Self {
        Self {
            attacker,
            target,
            weapon,
            base_damage: outcome.base_damage,
            final_damage: outcome.final_damage,
            modifiers: outcome.modifiers,
            is_critical: outcome.is_critical,
            is_evaded: outcome.is_evaded,
            experience_gained: 0,
            target_defeated: false,
            effects: Vec::new(),
            timestamp,
        }
    }

    pub fn push_effect(&mut self, effect: AppliedEffect) {
        self.effects.push(effect);
    }

    pub fn has_effect(&self, predicate: impl Fn(&AppliedEffect) -> bool) -> bool {
        self.effects.iter().any(predicate)
    }

    /// Equality that ignores the timestamp.
    pub fn same_outcome(&self, other: &BattleResult) -> bool {
        let mut other = other.clone();
        other.timestamp = self.timestamp;
        *self == other
    }
}
