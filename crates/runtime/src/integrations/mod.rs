//! Optional subsystems the orchestrator consults during an exchange.
//!
//! Every integration is optional. The orchestrator checks for presence at each
//! call site and falls back to fixed behavior when one is missing (fixed
//! experience, no recruitment, no job modifiers). Integration failures are
//! logged and never abort an exchange; only damage and defeat determination are
//! authoritative.
//!
//! The [`Animator`] is the one collaborator that is always present; it defaults
//! to [`NoopAnimator`].

mod ai;
mod animator;
mod character_loss;
mod experience;
mod job;
mod recruitment;
mod skill;
mod victory;

use std::sync::Arc;

pub use ai::{AiActionType, AiSystem};
pub use animator::{AnimationSettings, Animator, NoopAnimator, SoundCue};
pub use character_loss::{CharacterLossManager, LossCause};
pub use experience::{ExperienceGrant, ExperienceSystem};
pub use job::JobSystem;
pub use recruitment::{RecruitmentOutcome, RecruitmentSystem};
pub use skill::{SkillAction, SkillEffect, SkillExecution, SkillSystem};
pub use victory::{BattleOutcome, VictoryConditionSystem};

/// The set of attached optional subsystems.
#[derive(Clone, Default)]
pub struct Integrations {
    pub recruitment: Option<Arc<dyn RecruitmentSystem>>,
    pub character_loss: Option<Arc<dyn CharacterLossManager>>,
    pub skill: Option<Arc<dyn SkillSystem>>,
    pub experience: Option<Arc<dyn ExperienceSystem>>,
    pub job: Option<Arc<dyn JobSystem>>,
    pub ai: Option<Arc<dyn AiSystem>>,
    pub victory: Option<Arc<dyn VictoryConditionSystem>>,
}

impl Integrations {
    /// Names of the attached integrations, for diagnostics.
    pub fn attached(&self) -> Vec<&'static str> {
        let slots = [
            ("recruitment", self.recruitment.is_some()),
            ("character-loss", self.character_loss.is_some()),
            ("skill", self.skill.is_some()),
            ("experience", self.experience.is_some()),
            ("job", self.job.is_some()),
            ("ai", self.ai.is_some()),
            ("victory-condition", self.victory.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }
}

impl std::fmt::Debug for Integrations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.attached()).finish()
    }
}
