//! Notification payloads published by the orchestrator.

use battle_core::{BattleErrorKind, BattleResult, Position, UnitId};
use serde::{Deserialize, Serialize};

use crate::integrations::{AiActionType, BattleOutcome, LossCause};
use crate::recovery::RecoveryDirective;

/// Topics for coarse-grained subscriptions.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Attack flow: initiation, range, selection, cancellation
    Attack,
    /// Resolution of an exchange and its consequences
    Resolution,
    /// Errors, resets and recovery
    System,
}

/// Discriminant of [`BattleEvent`], used as the registry key.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    AttackInitiated,
    AttackRangeShown,
    TargetSelected,
    AttackCancelled,
    BattleComplete,
    CharacterLost,
    RecruitmentConversion,
    BossDefeated,
    BattleLevelUp,
    BattleError,
    CriticalError,
    SystemReset,
    AnimationFailed,
    ErrorRecovered,
    UnitUpdated,
    SkillExecuted,
    AiActionComplete,
    BattleOutcome,
}

impl EventKind {
    /// Wire name of the notification.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::AttackInitiated => "attack-initiated",
            EventKind::AttackRangeShown => "attack-range-shown",
            EventKind::TargetSelected => "target-selected",
            EventKind::AttackCancelled => "attack-cancelled",
            EventKind::BattleComplete => "battle-complete",
            EventKind::CharacterLost => "character-lost",
            EventKind::RecruitmentConversion => "recruitment-conversion",
            EventKind::BossDefeated => "boss_defeated",
            EventKind::BattleLevelUp => "battle-level-up",
            EventKind::BattleError => "battle-error",
            EventKind::CriticalError => "critical-error",
            EventKind::SystemReset => "system-reset",
            EventKind::AnimationFailed => "animation-failed",
            EventKind::ErrorRecovered => "error-recovered",
            EventKind::UnitUpdated => "unit-updated",
            EventKind::SkillExecuted => "skill-executed",
            EventKind::AiActionComplete => "ai-action-complete",
            EventKind::BattleOutcome => "battle-outcome",
        }
    }

    pub const fn topic(&self) -> Topic {
        match self {
            EventKind::AttackInitiated
            | EventKind::AttackRangeShown
            | EventKind::TargetSelected
            | EventKind::AttackCancelled => Topic::Attack,
            EventKind::BattleComplete
            | EventKind::CharacterLost
            | EventKind::RecruitmentConversion
            | EventKind::BossDefeated
            | EventKind::BattleLevelUp
            | EventKind::UnitUpdated
            | EventKind::SkillExecuted
            | EventKind::AiActionComplete
            | EventKind::BattleOutcome => Topic::Resolution,
            EventKind::BattleError
            | EventKind::CriticalError
            | EventKind::SystemReset
            | EventKind::AnimationFailed
            | EventKind::ErrorRecovered => Topic::System,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification published on the [`EventBus`](super::EventBus).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEvent {
    AttackInitiated {
        attacker: UnitId,
        weapon: String,
        valid_targets: Vec<UnitId>,
    },
    AttackRangeShown {
        attacker: UnitId,
        tiles: Vec<Position>,
    },
    TargetSelected {
        attacker: UnitId,
        target: UnitId,
    },
    AttackCancelled {
        attacker: Option<UnitId>,
    },
    BattleComplete {
        result: Box<BattleResult>,
    },
    CharacterLost {
        unit: UnitId,
        cause: LossCause,
    },
    RecruitmentConversion {
        unit: UnitId,
        recruiter: UnitId,
    },
    BossDefeated {
        boss: UnitId,
        name: String,
        rose_essence: u32,
    },
    BattleLevelUp {
        unit: UnitId,
        new_level: u32,
    },
    BattleError {
        kind: BattleErrorKind,
        message: String,
        suggested_action: String,
        directive: Option<RecoveryDirective>,
    },
    CriticalError {
        message: String,
    },
    SystemReset,
    /// Proxied from the animator: playback failed and was skipped.
    AnimationFailed {
        stage: String,
        message: String,
    },
    /// Proxied from the error handler: a directive was executed.
    ErrorRecovered {
        kind: BattleErrorKind,
        directive: RecoveryDirective,
    },
    UnitUpdated {
        unit: UnitId,
        previous_hp: u32,
        current_hp: u32,
    },
    SkillExecuted {
        caster: UnitId,
        skill_id: String,
        affected: Vec<UnitId>,
    },
    AiActionComplete {
        unit: UnitId,
        action: AiActionType,
        success: bool,
    },
    BattleOutcome {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BattleEvent::AttackInitiated { .. } => EventKind::AttackInitiated,
            BattleEvent::AttackRangeShown { .. } => EventKind::AttackRangeShown,
            BattleEvent::TargetSelected { .. } => EventKind::TargetSelected,
            BattleEvent::AttackCancelled { .. } => EventKind::AttackCancelled,
            BattleEvent::BattleComplete { .. } => EventKind::BattleComplete,
            BattleEvent::CharacterLost { .. } => EventKind::CharacterLost,
            BattleEvent::RecruitmentConversion { .. } => EventKind::RecruitmentConversion,
            BattleEvent::BossDefeated { .. } => EventKind::BossDefeated,
            BattleEvent::BattleLevelUp { .. } => EventKind::BattleLevelUp,
            BattleEvent::BattleError { .. } => EventKind::BattleError,
            BattleEvent::CriticalError { .. } => EventKind::CriticalError,
            BattleEvent::SystemReset => EventKind::SystemReset,
            BattleEvent::AnimationFailed { .. } => EventKind::AnimationFailed,
            BattleEvent::ErrorRecovered { .. } => EventKind::ErrorRecovered,
            BattleEvent::UnitUpdated { .. } => EventKind::UnitUpdated,
            BattleEvent::SkillExecuted { .. } => EventKind::SkillExecuted,
            BattleEvent::AiActionComplete { .. } => EventKind::AiActionComplete,
            BattleEvent::BattleOutcome { .. } => EventKind::BattleOutcome,
        }
    }

    pub fn topic(&self) -> Topic {
        self.kind().topic()
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
