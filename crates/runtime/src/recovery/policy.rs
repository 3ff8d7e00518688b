use battle_core::{BattleError, BattleErrorKind};
use serde::{Deserialize, Serialize};

use crate::error::RecoveryError;

/// What the orchestrator should do after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryDirective {
    /// Cancel the attack; the attacker may act again.
    Cancel,
    /// Stop everything and return to a clean idle state.
    Reset,
    /// Cancel so the caller can re-initiate.
    Retry,
    /// Keep attacker and weapon, clear the target.
    Fallback,
    /// Leave state untouched.
    Ignore,
}

impl RecoveryDirective {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryDirective::Cancel => "cancel",
            RecoveryDirective::Reset => "reset",
            RecoveryDirective::Retry => "retry",
            RecoveryDirective::Fallback => "fallback",
            RecoveryDirective::Ignore => "ignore",
        }
    }
}

impl std::fmt::Display for RecoveryDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a classified error to a directive.
///
/// Hosts override this to change recovery behavior. Returning an error sends
/// the orchestrator down the critical path: unconditional reset plus a
/// `critical-error` notification.
pub trait RecoveryPolicy: Send + Sync {
    fn decide(&self, error: &BattleError) -> Result<RecoveryDirective, RecoveryError>;
}

/// Default mapping from error kind to directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRecoveryPolicy;

impl RecoveryPolicy for StandardRecoveryPolicy {
    fn decide(&self, error: &BattleError) -> Result<RecoveryDirective, RecoveryError> {
        Ok(match error.kind {
            BattleErrorKind::InvalidAttacker
            | BattleErrorKind::AlreadyActed
            | BattleErrorKind::InsufficientMp
            | BattleErrorKind::InvalidWeapon
            | BattleErrorKind::WeaponBroken => RecoveryDirective::Cancel,
            BattleErrorKind::InvalidTarget
            | BattleErrorKind::OutOfRange
            | BattleErrorKind::TargetUnreachable => RecoveryDirective::Fallback,
            BattleErrorKind::AnimationFailed => RecoveryDirective::Ignore,
            BattleErrorKind::DamageCalculationFailed => RecoveryDirective::Retry,
            BattleErrorKind::BattleSystemError => RecoveryDirective::Reset,
        })
    }
}
