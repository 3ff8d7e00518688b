//! Battle error taxonomy.
//!
//! Every failure that reaches the orchestrator is a [`BattleError`] tagged with
//! a [`BattleErrorKind`] at the point where it is raised. Classification is a
//! field read, never a guess from the message text.
//!
//! # Design Principles
//!
//! - **Typed at source**: each constructor fixes the kind
//! - **Rich Context**: errors optionally carry a [`BattleContext`]
//! - **Severity Classification**: kinds map to a severity used by recovery

use crate::context::BattleContext;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the player can pick another target or weapon
/// - **Validation**: the request itself was invalid and should not be retried as is
/// - **Internal**: a collaborator misbehaved
/// - **Fatal**: orchestrator state can no longer be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or broken collaborator.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Fixed taxonomy of battle failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BattleErrorKind {
    InvalidAttacker,
    InvalidTarget,
    OutOfRange,
    AlreadyActed,
    InsufficientMp,
    InvalidWeapon,
    WeaponBroken,
    TargetUnreachable,
    AnimationFailed,
    DamageCalculationFailed,
    BattleSystemError,
}

impl BattleErrorKind {
    pub const ALL: [BattleErrorKind; 11] = [
        Self::InvalidAttacker,
        Self::InvalidTarget,
        Self::OutOfRange,
        Self::AlreadyActed,
        Self::InsufficientMp,
        Self::InvalidWeapon,
        Self::WeaponBroken,
        Self::TargetUnreachable,
        Self::AnimationFailed,
        Self::DamageCalculationFailed,
        Self::BattleSystemError,
    ];

    /// Stable error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAttacker => "INVALID_ATTACKER",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::AlreadyActed => "ALREADY_ACTED",
            Self::InsufficientMp => "INSUFFICIENT_MP",
            Self::InvalidWeapon => "INVALID_WEAPON",
            Self::WeaponBroken => "WEAPON_BROKEN",
            Self::TargetUnreachable => "TARGET_UNREACHABLE",
            Self::AnimationFailed => "ANIMATION_FAILED",
            Self::DamageCalculationFailed => "DAMAGE_CALCULATION_FAILED",
            Self::BattleSystemError => "BATTLE_SYSTEM_ERROR",
        }
    }

    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OutOfRange | Self::TargetUnreachable | Self::InvalidTarget => {
                ErrorSeverity::Recoverable
            }
            Self::InvalidAttacker
            | Self::AlreadyActed
            | Self::InsufficientMp
            | Self::InvalidWeapon
            | Self::WeaponBroken => ErrorSeverity::Validation,
            Self::AnimationFailed | Self::DamageCalculationFailed => ErrorSeverity::Internal,
            Self::BattleSystemError => ErrorSeverity::Fatal,
        }
    }

    /// Human-readable hint shown to the player alongside the error.
    pub const fn suggested_action(&self) -> &'static str {
        match self {
            Self::InvalidAttacker => "Select a living unit that can still act",
            Self::InvalidTarget => "Choose a different target",
            Self::OutOfRange => "Move closer or choose a target inside the highlighted range",
            Self::AlreadyActed => "This unit has already acted this turn; select another unit",
            Self::InsufficientMp => "Not enough MP; use a regular attack or wait",
            Self::InvalidWeapon => "Equip a weapon before attacking",
            Self::WeaponBroken => "Repair or replace the broken weapon",
            Self::TargetUnreachable => "The target cannot be reached from here",
            Self::AnimationFailed => "Animation skipped; the battle continues",
            Self::DamageCalculationFailed => "Damage could not be calculated; try again",
            Self::BattleSystemError => "The battle system was reset; start the action again",
        }
    }
}

impl std::fmt::Display for BattleErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified battle failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{kind}: {message}")]
pub struct BattleError {
    pub kind: BattleErrorKind,
    pub message: String,
    pub context: Option<Box<BattleContext>>,
}

impl BattleError {
    pub fn new(kind: BattleErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    pub fn invalid_attacker(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::InvalidAttacker, message)
    }

    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::InvalidTarget, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::OutOfRange, message)
    }

    pub fn already_acted(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::AlreadyActed, message)
    }

    pub fn insufficient_mp(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::InsufficientMp, message)
    }

    pub fn invalid_weapon(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::InvalidWeapon, message)
    }

    pub fn weapon_broken(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::WeaponBroken, message)
    }

    pub fn target_unreachable(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::TargetUnreachable, message)
    }

    pub fn animation_failed(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::AnimationFailed, message)
    }

    pub fn damage_calculation(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::DamageCalculationFailed, message)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(BattleErrorKind::BattleSystemError, message)
    }

    /// Attaches a context (builder pattern). An existing context is replaced.
    #[must_use]
    pub fn with_context(mut self, context: BattleContext) -> Self {
        self.context = Some(Box::new(context));
        self
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.kind.severity()
    }

    pub fn suggested_action(&self) -> &'static str {
        self.kind.suggested_action()
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn context(&self) -> Option<&BattleContext> {
        self.context.as_deref()
    }
}
