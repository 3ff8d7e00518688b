//! Resolution of one attacker → target exchange.
//!
//! Steps, in order:
//! 1. merge job modifiers into a working weapon and modifier list
//! 2. compute damage once and build the result
//! 3. job post-processing
//! 4. attack and hit animations (presentation only)
//! 5. recruitment eligibility, then damage application
//! 6. defeat handling: boss, victory notices, recruitment, defeat animation, character loss
//! 7. experience
//! 8. victory bookkeeping, history, snapshot, attacker marked acted, victory check
//! 9. back to idle, callbacks, `battle-complete`
use std::future::Future;
use std::sync::Arc;

use rand::Rng;

use battle_core::{
    AppliedEffect, BattleError, BattlePhase, BattleResult, CombatRolls, DamageRequest, Faction,
    Modifier, Unit, UnitId, Weapon,
};

use super::{BattleOrchestrator, log_integration_failure};
use crate::clock;
use crate::error::{AnimationError, Result};
use crate::events::BattleEvent;
use crate::integrations::{LossCause, SoundCue};
use crate::recovery::RecoveryDirective;
use crate::state_manager::HpChange;

/// Experience granted without an experience integration.
pub const FALLBACK_HIT_EXPERIENCE: u32 = 10;
pub const FALLBACK_KILL_EXPERIENCE: u32 = 50;

type CompleteCallback = Box<dyn FnOnce(&BattleResult) + Send>;
type ErrorCallback = Box<dyn FnOnce(&BattleError) + Send>;

/// Per-exchange options for [`BattleOrchestrator::select_target`].
#[derive(Default)]
pub struct BattleOptions {
    /// Applied before any job modifiers.
    pub custom_modifiers: Vec<Modifier>,
    pub skip_animations: bool,
    on_complete: Option<CompleteCallback>,
    on_error: Option<ErrorCallback>,
}

impl BattleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.custom_modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn skip_animations(mut self) -> Self {
        self.skip_animations = true;
        self
    }

    /// Called with the recorded result after the orchestrator is back to idle.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce(&BattleResult) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Called with the classified error after the orchestrator is back to idle.
    #[must_use]
    pub fn on_error(mut self, callback: impl FnOnce(&BattleError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for BattleOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleOptions")
            .field("custom_modifiers", &self.custom_modifiers)
            .field("skip_animations", &self.skip_animations)
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// How a defeated unit is processed.
pub(super) struct DefeatContext<'a> {
    pub attacker: &'a Unit,
    pub cause: LossCause,
    pub recruitment_eligible: bool,
    pub animate: bool,
}

impl BattleOrchestrator {
    /// Runs the pipeline for an exchange already in `battle_execution`.
    ///
    /// Always ends idle. Failures are routed through the error handler before
    /// being returned.
    pub(crate) async fn execute_battle(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        weapon: Weapon,
        mut options: BattleOptions,
    ) -> Result<BattleResult> {
        let on_complete = options.on_complete.take();
        let on_error = options.on_error.take();

        match self.run_pipeline(attacker, target, weapon, options).await {
            Ok(result) => {
                self.animator.clear_highlights();
                self.target_selector.clear();
                self.state.last_battle_result = Some(result.clone());
                self.state.reset_to_idle();

                if let Some(callback) = on_complete {
                    callback(&result);
                }
                self.publish(BattleEvent::BattleComplete {
                    result: Box::new(result.clone()),
                });
                Ok(result)
            }
            Err(err) => {
                let err = self.fail_pipeline(err);
                if let Some(callback) = on_error {
                    callback(&err);
                }
                Err(err)
            }
        }
    }

    async fn run_pipeline(
        &mut self,
        attacker_id: UnitId,
        target_id: UnitId,
        weapon: Weapon,
        options: BattleOptions,
    ) -> Result<BattleResult> {
        let attacker = self.unit_snapshot(attacker_id)?;
        let target = self.unit_snapshot(target_id)?;
        let animate = self.config.enable_animations && !options.skip_animations;
        let sound = self.config.enable_sound_effects && !options.skip_animations;

        // 1. job modifiers
        let (weapon, modifiers) =
            self.merge_modifiers(&attacker, &target, &weapon, options.custom_modifiers);

        // 2. damage
        let rolls = self.roll();
        let outcome = self
            .damage_calculator
            .calculate(&DamageRequest {
                attacker: &attacker,
                target: &target,
                weapon: &weapon,
                modifiers: &modifiers,
                rolls,
            })
            .map_err(BattleError::from)?;
        let mut result = BattleResult::from_outcome(
            attacker_id,
            target_id,
            weapon.clone(),
            outcome,
            clock::now_millis(),
        );

        // 3. job post-processing
        if let Some(job) = &self.integrations.job {
            if let Err(err) = job.post_process(&mut result) {
                log_integration_failure(&err);
            }
        }

        // 4. presentation
        self.state.transition(BattlePhase::Animation)?;
        if sound {
            self.animator.play_sound(SoundCue::Attack);
        }
        if animate {
            let animator = Arc::clone(&self.animator);
            self.play("attack", animator.play_attack(&attacker, &target, &weapon))
                .await;
            if !result.is_evaded {
                self.play("hit", animator.play_hit_effect(&target, result.is_critical))
                    .await;
                self.play(
                    "damage",
                    animator.show_damage(&target, result.final_damage, result.is_critical),
                )
                .await;
            }
        }
        if sound && !result.is_evaded {
            self.animator.play_sound(if result.is_critical {
                SoundCue::Critical
            } else {
                SoundCue::Hit
            });
        }

        // 5. recruitment eligibility precedes damage
        if !result.is_evaded {
            let eligible = self.recruitment_eligible(&attacker, &target, result.final_damage);
            let change = self.state_manager.apply_damage(
                &mut self.roster,
                Some(attacker_id),
                target_id,
                result.final_damage,
            )?;
            if animate {
                self.animate_hp_change(change).await;
            }
            result.target_defeated = change.defeated();

            // 6. defeat
            if result.target_defeated {
                let defeat = DefeatContext {
                    attacker: &attacker,
                    cause: LossCause::Battle {
                        attacker: attacker_id,
                        weapon: weapon.id.clone(),
                    },
                    recruitment_eligible: eligible,
                    animate,
                };
                self.resolve_defeat(defeat, target_id, &mut result).await?;
            }
        }

        // 7. experience
        self.state.transition(BattlePhase::Cleanup)?;
        let target = self.unit_snapshot(target_id)?;
        self.grant_battle_experience(&attacker, &target, &mut result);

        // 8. bookkeeping
        if let Some(victory) = &self.integrations.victory {
            if let Err(err) = victory.record_damage(attacker_id, target_id, result.final_damage) {
                log_integration_failure(&err);
            }
        }
        self.record_result(result.clone());
        self.snapshot_roster();
        self.state_manager.mark_acted(&mut self.roster, attacker_id)?;
        self.check_victory_conditions();

        Ok(result)
    }

    /// Step 6. Shared by attacks and damaging skills.
    pub(super) async fn resolve_defeat(
        &mut self,
        defeat: DefeatContext<'_>,
        target_id: UnitId,
        result: &mut BattleResult,
    ) -> Result<()> {
        let target = self.unit_snapshot(target_id)?;

        if let Some(boss) = &target.boss {
            tracing::info!(
                target: "battle::orchestrator",
                boss = %boss.name,
                rose_essence = boss.rose_essence,
                "boss defeated"
            );
            result.push_effect(AppliedEffect::BossDefeated {
                boss: target_id,
                rose_essence: boss.rose_essence,
            });
            self.publish(BattleEvent::BossDefeated {
                boss: target_id,
                name: boss.name.clone(),
                rose_essence: boss.rose_essence,
            });
        }

        if let Some(victory) = &self.integrations.victory {
            if target.is_boss() {
                if let Err(err) = victory.on_boss_defeated(&target) {
                    log_integration_failure(&err);
                }
            }
            if target.faction == Faction::Enemy {
                if let Err(err) = victory.on_enemy_defeated(&target) {
                    log_integration_failure(&err);
                }
            }
        }

        if defeat.recruitment_eligible && self.try_recruit(defeat.attacker, &target)? {
            result.target_defeated = false;
            result.push_effect(AppliedEffect::Recruited { unit: target_id });
            return Ok(());
        }

        if defeat.animate {
            let animator = Arc::clone(&self.animator);
            self.play("defeat", animator.play_defeat(&target)).await;
        }
        if self.config.enable_sound_effects && defeat.animate {
            self.animator.play_sound(SoundCue::Defeat);
        }

        if target.faction == Faction::Player {
            self.process_character_loss(&target, &defeat.cause).await;
            result.push_effect(AppliedEffect::CharacterLost { unit: target_id });
        }
        Ok(())
    }

    /// Records a result and optionally logs it.
    pub(super) fn record_result(&mut self, result: BattleResult) {
        if self.config.enable_battle_logging {
            tracing::info!(
                target: "battle::orchestrator",
                attacker = %result.attacker,
                target = %result.target,
                weapon = %result.weapon.name,
                damage = result.final_damage,
                critical = result.is_critical,
                evaded = result.is_evaded,
                defeated = result.target_defeated,
                experience = result.experience_gained,
                "battle result"
            );
        }
        self.state_manager.record_result(result);
    }

    pub(super) fn snapshot_roster(&self) {
        if let Some(manager) = &self.integrations.character_loss {
            if let Err(err) = manager.record_state_snapshot(self.roster.as_slice()) {
                log_integration_failure(&err);
            }
        }
    }

    pub(super) fn check_victory_conditions(&mut self) {
        let Some(victory) = &self.integrations.victory else {
            return;
        };
        match victory.check_conditions(self.roster.as_slice(), self.turn) {
            Ok(Some(outcome)) if self.outcome != Some(outcome) => {
                tracing::info!(
                    target: "battle::orchestrator",
                    outcome = ?outcome,
                    turn = self.turn,
                    "battle decided"
                );
                self.outcome = Some(outcome);
                self.publish(BattleEvent::BattleOutcome { outcome });
            }
            Ok(_) => {}
            Err(err) => log_integration_failure(&err),
        }
    }

    /// Applies a level-up reported by the experience integration.
    pub(super) fn apply_level_up(
        &mut self,
        unit: UnitId,
        new_level: u32,
        result: &mut BattleResult,
    ) {
        if let Some(unit) = self.roster.get_mut(unit) {
            unit.level = new_level;
        }
        result.push_effect(AppliedEffect::LevelUp { unit, new_level });
        self.publish(BattleEvent::BattleLevelUp { unit, new_level });
    }

    /// Awaits one animation; failures are recorded and skipped.
    pub(super) async fn play<F>(&mut self, stage: &'static str, playback: F)
    where
        F: Future<Output = std::result::Result<(), AnimationError>>,
    {
        self.state.is_animating = true;
        let outcome = playback.await;
        self.state.is_animating = false;

        if let Err(err) = outcome {
            tracing::warn!(
                target: "battle::orchestrator",
                stage,
                error = %err,
                "animation failed, skipping"
            );
            let error = BattleError::from(err);
            self.error_handler
                .record(&error, Some(RecoveryDirective::Ignore));
            self.publish(BattleEvent::AnimationFailed {
                stage: stage.to_string(),
                message: error.message.clone(),
            });
        }
    }

    pub(super) async fn animate_hp_change(&mut self, change: HpChange) {
        let Ok(unit) = self.unit_snapshot(change.unit) else {
            return;
        };
        let animator = Arc::clone(&self.animator);
        self.play(
            "hp",
            animator.animate_hp_change(&unit, change.previous_hp, change.current_hp),
        )
        .await;
    }

    fn merge_modifiers(
        &self,
        attacker: &Unit,
        target: &Unit,
        weapon: &Weapon,
        custom: Vec<Modifier>,
    ) -> (Weapon, Vec<Modifier>) {
        let mut modifiers = custom;
        let Some(job) = &self.integrations.job else {
            return (weapon.clone(), modifiers);
        };

        let working = job
            .modify_weapon(attacker, weapon)
            .unwrap_or_else(|| weapon.clone());
        match job.attack_modifiers(attacker, &working) {
            Ok(extra) => modifiers.extend(extra),
            Err(err) => log_integration_failure(&err),
        }
        match job.defense_modifiers(target) {
            Ok(extra) => modifiers.extend(extra),
            Err(err) => log_integration_failure(&err),
        }
        (working, modifiers)
    }

    fn roll(&mut self) -> CombatRolls {
        CombatRolls {
            hit: self.rng.gen_range(0..100),
            critical: self.rng.gen_range(0..100),
        }
    }

    /// Only enemies can be recruited; player units always go through loss.
    fn recruitment_eligible(&self, attacker: &Unit, target: &Unit, planned_damage: u32) -> bool {
        if target.faction != Faction::Enemy {
            return false;
        }
        let Some(recruitment) = &self.integrations.recruitment else {
            return false;
        };
        match recruitment.check_eligibility(attacker, target, planned_damage, self.turn) {
            Ok(eligible) => eligible,
            Err(err) => {
                log_integration_failure(&err);
                false
            }
        }
    }

    /// Returns true if the defeated target was converted.
    fn try_recruit(&mut self, attacker: &Unit, target: &Unit) -> Result<bool> {
        if target.faction != Faction::Enemy {
            return Ok(false);
        }
        let Some(recruitment) = self.integrations.recruitment.clone() else {
            return Ok(false);
        };
        let outcome = match recruitment.process_attempt(attacker, target, self.turn) {
            Ok(outcome) => outcome,
            Err(err) => {
                log_integration_failure(&err);
                return Ok(false);
            }
        };
        if !outcome.recruited {
            return Ok(false);
        }

        self.state_manager.convert_to_npc(&mut self.roster, target.id)?;
        tracing::info!(
            target: "battle::orchestrator",
            unit = %target.id,
            recruiter = %attacker.id,
            "defeated unit recruited"
        );
        self.publish(BattleEvent::RecruitmentConversion {
            unit: target.id,
            recruiter: attacker.id,
        });
        Ok(true)
    }

    pub(super) async fn process_character_loss(&mut self, unit: &Unit, cause: &LossCause) {
        if let Some(manager) = self.integrations.character_loss.clone() {
            if let Err(err) = manager.process_character_loss(unit, cause).await {
                log_integration_failure(&err);
            }
        }
        tracing::info!(
            target: "battle::orchestrator",
            unit = %unit.id,
            name = %unit.name,
            "character lost"
        );
        self.publish(BattleEvent::CharacterLost {
            unit: unit.id,
            cause: cause.clone(),
        });
    }

    fn grant_battle_experience(
        &mut self,
        attacker: &Unit,
        target: &Unit,
        result: &mut BattleResult,
    ) {
        let fallback = if result.is_evaded {
            0
        } else if result.target_defeated {
            FALLBACK_KILL_EXPERIENCE
        } else {
            FALLBACK_HIT_EXPERIENCE
        };

        let Some(experience) = self.integrations.experience.clone() else {
            result.experience_gained = fallback;
            return;
        };

        match experience.grant_battle_experience(attacker, target, result) {
            Ok(grant) => {
                result.experience_gained = grant.amount;
                if let Some(level) = grant.new_level {
                    self.apply_level_up(attacker.id, level, result);
                }
            }
            Err(err) => {
                log_integration_failure(&err);
                result.experience_gained = fallback;
            }
        }
    }
}
