use battle_core::{BattleResult, Unit};

use crate::error::IntegrationError;

/// Experience awarded to one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExperienceGrant {
    pub amount: u32,
    /// Set when the grant crossed a level threshold.
    pub new_level: Option<u32>,
}

pub trait ExperienceSystem: Send + Sync {
    fn grant_battle_experience(
        &self,
        attacker: &Unit,
        target: &Unit,
        result: &BattleResult,
    ) -> Result<ExperienceGrant, IntegrationError>;

    fn grant_skill_experience(
        &self,
        caster: &Unit,
        skill_id: &str,
        affected: usize,
    ) -> Result<ExperienceGrant, IntegrationError>;
}
