//! Presentation seam: visual and audio playback.
use std::time::Duration;

use async_trait::async_trait;
use battle_core::{Position, Unit, Weapon};

use crate::error::AnimationError;

/// Playback parameters forwarded from [`BattleConfig`](crate::BattleConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    pub speed: f32,
    /// Hint only; the orchestrator never enforces it.
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Attack,
    Hit,
    Critical,
    Defeat,
    Heal,
}

/// Trait for playing battle animations and sounds.
///
/// Animations are presentation-only: the orchestrator computes and applies
/// every state change itself, so a failing or absent animator never changes
/// a [`BattleResult`](battle_core::BattleResult).
#[async_trait]
pub trait Animator: Send + Sync {
    async fn play_attack(
        &self,
        attacker: &Unit,
        target: &Unit,
        weapon: &Weapon,
    ) -> Result<(), AnimationError>;

    async fn play_hit_effect(&self, target: &Unit, is_critical: bool) -> Result<(), AnimationError>;

    async fn show_damage(
        &self,
        target: &Unit,
        amount: u32,
        is_critical: bool,
    ) -> Result<(), AnimationError>;

    async fn animate_hp_change(&self, unit: &Unit, from: u32, to: u32)
    -> Result<(), AnimationError>;

    async fn play_defeat(&self, unit: &Unit) -> Result<(), AnimationError>;

    fn highlight_range(&self, _tiles: &[Position]) {}

    fn clear_highlights(&self) {}

    fn stop_all(&self) {}

    fn play_sound(&self, _cue: SoundCue) {}

    fn configure(&self, _settings: AnimationSettings) {}
}

/// Animator that plays nothing. Used when no presentation layer is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnimator;

#[async_trait]
impl Animator for NoopAnimator {
    async fn play_attack(
        &self,
        _attacker: &Unit,
        _target: &Unit,
        _weapon: &Weapon,
    ) -> Result<(), AnimationError> {
        Ok(())
    }

    async fn play_hit_effect(
        &self,
        _target: &Unit,
        _is_critical: bool,
    ) -> Result<(), AnimationError> {
        Ok(())
    }

    async fn show_damage(
        &self,
        _target: &Unit,
        _amount: u32,
        _is_critical: bool,
    ) -> Result<(), AnimationError> {
        Ok(())
    }

    async fn animate_hp_change(
        &self,
        _unit: &Unit,
        _from: u32,
        _to: u32,
    ) -> Result<(), AnimationError> {
        Ok(())
    }

    async fn play_defeat(&self, _unit: &Unit) -> Result<(), AnimationError> {
        Ok(())
    }
}
