use async_trait::async_trait;
use battle_core::{Unit, UnitId};
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// What defeated a player unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LossCause {
    Battle { attacker: UnitId, weapon: String },
    Skill { caster: UnitId, skill_id: String },
}

/// Tracks permanently lost player characters.
#[async_trait]
pub trait CharacterLossManager: Send + Sync {
    async fn process_character_loss(
        &self,
        unit: &Unit,
        cause: &LossCause,
    ) -> Result<(), IntegrationError>;

    /// Called after every recorded exchange with the full roster.
    fn record_state_snapshot(&self, _units: &[Unit]) -> Result<(), IntegrationError> {
        Ok(())
    }
}
