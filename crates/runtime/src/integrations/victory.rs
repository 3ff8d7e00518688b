use battle_core::{Unit, UnitId};
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// Tracks win/lose conditions across exchanges.
pub trait VictoryConditionSystem: Send + Sync {
    fn on_boss_defeated(&self, boss: &Unit) -> Result<(), IntegrationError>;

    fn on_enemy_defeated(&self, enemy: &Unit) -> Result<(), IntegrationError>;

    fn record_damage(
        &self,
        attacker: UnitId,
        target: UnitId,
        amount: u32,
    ) -> Result<(), IntegrationError>;

    /// Returns `Some` once the battle is decided.
    fn check_conditions(
        &self,
        units: &[Unit],
        turn: u32,
    ) -> Result<Option<BattleOutcome>, IntegrationError>;
}
