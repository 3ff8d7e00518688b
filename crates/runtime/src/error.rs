//! Error types surfaced by the runtime API.
//!
//! Every public operation returns [`battle_core::BattleError`], so callers get
//! a kind, a message and a suggested action. The types here describe failures
//! of collaborators and are converted into a `BattleError` at the boundary
//! where the orchestrator decides whether they matter.
use std::fmt;

use battle_core::BattleError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BattleError>;

/// Optional subsystem an [`IntegrationError`] originated from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntegrationKind {
    Recruitment,
    CharacterLoss,
    Skill,
    Experience,
    Job,
    Ai,
    VictoryCondition,
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IntegrationKind::Recruitment => "recruitment",
            IntegrationKind::CharacterLoss => "character-loss",
            IntegrationKind::Skill => "skill",
            IntegrationKind::Experience => "experience",
            IntegrationKind::Job => "job",
            IntegrationKind::Ai => "ai",
            IntegrationKind::VictoryCondition => "victory-condition",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{system} integration failed: {message}")]
pub struct IntegrationError {
    pub system: IntegrationKind,
    pub message: String,
}

impl IntegrationError {
    pub fn new(system: IntegrationKind, message: impl Into<String>) -> Self {
        Self {
            system,
            message: message.into(),
        }
    }
}

impl From<IntegrationError> for BattleError {
    fn from(err: IntegrationError) -> Self {
        BattleError::system(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("{stage} animation failed: {message}")]
    Playback {
        stage: &'static str,
        message: String,
    },

    #[error("animation cancelled")]
    Cancelled,
}

impl AnimationError {
    pub fn playback(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Playback {
            stage,
            message: message.into(),
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            AnimationError::Playback { stage, .. } => stage,
            AnimationError::Cancelled => "any",
        }
    }
}

impl From<AnimationError> for BattleError {
    fn from(err: AnimationError) -> Self {
        BattleError::animation_failed(err.to_string())
    }
}

/// Failure of the recovery machinery itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("recovery policy failed: {0}")]
    Policy(String),
}
