//! Runtime orchestration for tactical battles.
//!
//! This crate drives combat exchanges defined by `battle-core`: it owns the
//! phase state machine, sequences the range/target/damage collaborators,
//! applies state changes and coordinates optional subsystems such as
//! recruitment, experience and victory conditions.
//!
//! Modules are organized by responsibility:
//! - [`orchestrator`] hosts [`BattleOrchestrator`] and its builder
//! - [`events`] provides the synchronous event bus and notification types
//! - [`integrations`] defines the optional subsystem traits and the animator
//! - [`recovery`] classifies failures and decides recovery directives
//! - [`state_manager`] applies HP/MP changes and keeps result history
//! - [`config`] holds [`BattleConfig`] and its environment loader
pub mod config;
pub mod error;
pub mod events;
pub mod integrations;
pub mod orchestrator;
pub mod recovery;
pub mod state_manager;

mod clock;

pub use config::{BattleConfig, ConfigError};
pub use error::{AnimationError, IntegrationError, IntegrationKind, RecoveryError, Result};
pub use events::{BattleEvent, EventBus, EventHandler, EventKind, SubscriptionId, Topic};
pub use integrations::{
    AiActionType, AiSystem, AnimationSettings, Animator, BattleOutcome, CharacterLossManager,
    ExperienceGrant, ExperienceSystem, Integrations, JobSystem, LossCause, NoopAnimator,
    RecruitmentOutcome, RecruitmentSystem, SkillAction, SkillEffect, SkillExecution, SkillSystem,
    SoundCue, VictoryConditionSystem,
};
pub use orchestrator::{
    AiAction, AiActionKind, AiActionOutcome, BattleOptions, BattleOrchestrator,
    FALLBACK_HIT_EXPERIENCE, FALLBACK_KILL_EXPERIENCE,
    BattleOrchestratorBuilder, BattleSystemState, IntegrityReport, SkillActionResult, SkillSummary,
};
pub use recovery::{
    ErrorHandler, ErrorRecord, ErrorStatistics, RecoveryDirective, RecoveryPolicy,
    StandardRecoveryPolicy,
};
pub use state_manager::{BattleStateManager, CombatTally, HpChange};
