use battle_core::{BattleResult, Position, UnitId, Weapon};

use super::skill::SkillActionResult;
use super::{BattleOrchestrator, log_integration_failure};
use super::pipeline::BattleOptions;
use crate::error::Result;
use crate::events::BattleEvent;
use crate::integrations::{AiActionType, SkillAction};

/// What an AI-controlled unit wants to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiActionKind {
    Attack {
        target: UnitId,
        weapon: Option<Weapon>,
    },
    Skill(SkillAction),
    Move {
        to: Position,
    },
    Wait,
}

impl AiActionKind {
    pub fn action_type(&self) -> AiActionType {
        match self {
            AiActionKind::Attack { .. } => AiActionType::Attack,
            AiActionKind::Skill(_) => AiActionType::Skill,
            AiActionKind::Move { .. } => AiActionType::Move,
            AiActionKind::Wait => AiActionType::Wait,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiAction {
    pub unit: UnitId,
    pub kind: AiActionKind,
}

impl AiAction {
    pub fn attack(unit: UnitId, target: UnitId) -> Self {
        Self {
            unit,
            kind: AiActionKind::Attack {
                target,
                weapon: None,
            },
        }
    }

    pub fn wait(unit: UnitId) -> Self {
        Self {
            unit,
            kind: AiActionKind::Wait,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiActionOutcome {
    Attack(Box<BattleResult>),
    Skill(SkillActionResult),
    /// Movement and waiting are handled elsewhere.
    NoOp,
}

impl BattleOrchestrator {
    /// Runs an AI decision through the same paths a player would use.
    ///
    /// Attacks go through `initiate_attack` and `select_target`; a rejected
    /// target cancels the attack. Completion is always reported with
    /// [`notify_ai_action_complete`](Self::notify_ai_action_complete).
    pub async fn execute_ai_action(&mut self, action: AiAction) -> Result<AiActionOutcome> {
        let action_type = action.kind.action_type();
        tracing::debug!(
            target: "battle::orchestrator",
            unit = %action.unit,
            action = action_type.as_str(),
            "executing ai action"
        );

        let outcome = match action.kind {
            AiActionKind::Attack { target, weapon } => self
                .ai_attack(action.unit, target, weapon)
                .await
                .map(|result| AiActionOutcome::Attack(Box::new(result))),
            AiActionKind::Skill(skill) => {
                let result = self.execute_skill_action(skill).await;
                Ok(AiActionOutcome::Skill(result))
            }
            AiActionKind::Move { .. } | AiActionKind::Wait => Ok(AiActionOutcome::NoOp),
        };

        let success = match &outcome {
            Ok(AiActionOutcome::Skill(result)) => result.success,
            Ok(_) => true,
            Err(_) => false,
        };
        self.notify_ai_action_complete(action.unit, action_type, success);
        outcome
    }

    /// Forwards completion to the AI integration and publishes
    /// `ai-action-complete`.
    pub fn notify_ai_action_complete(&self, unit: UnitId, action: AiActionType, success: bool) {
        if let Some(ai) = &self.integrations.ai {
            if let Err(err) = ai.on_action_complete(unit, action, success) {
                log_integration_failure(&err);
            }
        }
        self.publish(BattleEvent::AiActionComplete {
            unit,
            action,
            success,
        });
    }

    async fn ai_attack(
        &mut self,
        unit: UnitId,
        target: UnitId,
        weapon: Option<Weapon>,
    ) -> Result<BattleResult> {
        self.initiate_attack(unit, weapon)?;
        let result = self.select_target(target, BattleOptions::default()).await;
        if result.is_err() && self.state.is_active {
            self.cancel_attack();
        }
        result
    }
}
