use battle_core::UnitId;
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiActionType {
    Attack,
    Skill,
    Move,
    Wait,
}

impl AiActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiActionType::Attack => "attack",
            AiActionType::Skill => "skill",
            AiActionType::Move => "move",
            AiActionType::Wait => "wait",
        }
    }
}

/// Receives completion notices for AI-driven actions.
pub trait AiSystem: Send + Sync {
    fn on_action_complete(
        &self,
        unit: UnitId,
        action: AiActionType,
        success: bool,
    ) -> Result<(), IntegrationError>;
}
