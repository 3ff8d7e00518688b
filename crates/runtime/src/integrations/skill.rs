use async_trait::async_trait;
use battle_core::{Position, Unit, UnitId};
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// Request to cast a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAction {
    pub caster: UnitId,
    pub skill_id: String,
    pub targets: Vec<UnitId>,
    pub target_position: Option<Position>,
}

impl SkillAction {
    pub fn new(caster: UnitId, skill_id: impl Into<String>, targets: Vec<UnitId>) -> Self {
        Self {
            caster,
            skill_id: skill_id.into(),
            targets,
            target_position: None,
        }
    }

    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.target_position = Some(position);
        self
    }
}

/// One effect computed by the skill system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkillEffect {
    Damage { target: UnitId, amount: u32, critical: bool },
    Heal { target: UnitId, amount: u32 },
    Status { target: UnitId, name: String },
}

impl SkillEffect {
    pub fn target(&self) -> UnitId {
        match self {
            SkillEffect::Damage { target, .. }
            | SkillEffect::Heal { target, .. }
            | SkillEffect::Status { target, .. } => *target,
        }
    }
}

/// Effects of a cast, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillExecution {
    pub skill_name: String,
    pub power: u32,
    pub mp_cost: u32,
    pub effects: Vec<SkillEffect>,
}

/// Computes skill effects. Skill data and learning live behind this trait.
#[async_trait]
pub trait SkillSystem: Send + Sync {
    fn can_use_skill(&self, caster: &Unit, skill_id: &str) -> bool;

    /// Computes the effects of `action`. The orchestrator applies them.
    async fn execute_skill(
        &self,
        action: &SkillAction,
        units: &[Unit],
    ) -> Result<SkillExecution, IntegrationError>;
}
