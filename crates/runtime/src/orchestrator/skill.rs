use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    AppliedEffect, BattleError, BattlePhase, BattleResult, DamageOutcome, UnitId, Weapon,
};
use serde::Serialize;
use tokio::time::Instant;

use super::BattleOrchestrator;
use super::pipeline::DefeatContext;
use crate::clock;
use crate::error::Result;
use crate::events::BattleEvent;
use crate::integrations::{LossCause, SkillAction, SkillEffect, SkillExecution, SkillSystem};

/// Aggregate of one cast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub skill_id: String,
    pub skill_name: String,
    pub affected_units: Vec<UnitId>,
    pub total_damage: u32,
    pub total_healing: u32,
    pub status_effects: usize,
    pub elapsed: Duration,
}

/// Outcome of [`BattleOrchestrator::execute_skill_action`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillActionResult {
    pub success: bool,
    /// One synthetic result per applied effect.
    pub battle_results: Vec<BattleResult>,
    pub summary: Option<SkillSummary>,
    pub error: Option<BattleError>,
}

impl SkillActionResult {
    fn failed(error: BattleError) -> Self {
        Self {
            success: false,
            battle_results: Vec::new(),
            summary: None,
            error: Some(error),
        }
    }
}

impl BattleOrchestrator {
    /// Casts a skill through the skill integration and applies its effects.
    ///
    /// Never returns an `Err`: failures are reported in the result and the
    /// orchestrator is idle afterwards.
    pub async fn execute_skill_action(&mut self, action: SkillAction) -> SkillActionResult {
        let Some(skills) = self.integrations.skill.clone() else {
            let err = BattleError::system("no skill system attached");
            return SkillActionResult::failed(self.reject(err));
        };

        if let Err(err) = self.check_skill_preconditions(&action, skills.as_ref()) {
            return SkillActionResult::failed(self.reject(err));
        }

        match self.run_skill(&action, skills).await {
            Ok((battle_results, summary)) => {
                self.animator.clear_highlights();
                self.state.last_battle_result = battle_results.last().cloned();
                self.state.reset_to_idle();

                tracing::debug!(
                    target: "battle::orchestrator",
                    caster = %action.caster,
                    skill = %action.skill_id,
                    affected = summary.affected_units.len(),
                    damage = summary.total_damage,
                    healing = summary.total_healing,
                    "skill executed"
                );
                self.publish(BattleEvent::SkillExecuted {
                    caster: action.caster,
                    skill_id: action.skill_id.clone(),
                    affected: summary.affected_units.clone(),
                });

                SkillActionResult {
                    success: true,
                    battle_results,
                    summary: Some(summary),
                    error: None,
                }
            }
            Err(err) => SkillActionResult::failed(self.fail_pipeline(err)),
        }
    }

    fn check_skill_preconditions(
        &self,
        action: &SkillAction,
        skills: &dyn SkillSystem,
    ) -> Result<()> {
        if self.state.is_active {
            return Err(BattleError::system("a battle is already in progress"));
        }
        let caster = self.roster.get(action.caster).ok_or_else(|| {
            BattleError::invalid_attacker(format!("unit {} does not exist", action.caster))
        })?;
        if !caster.is_alive() {
            return Err(BattleError::invalid_attacker(format!(
                "{} is defeated",
                caster.name
            )));
        }
        if caster.has_acted {
            return Err(BattleError::already_acted(format!(
                "{} has already acted this turn",
                caster.name
            )));
        }
        if !skills.can_use_skill(caster, &action.skill_id) {
            return Err(BattleError::invalid_weapon(format!(
                "{} cannot use skill {}",
                caster.name, action.skill_id
            )));
        }
        Ok(())
    }

    async fn run_skill(
        &mut self,
        action: &SkillAction,
        skills: Arc<dyn SkillSystem>,
    ) -> Result<(Vec<BattleResult>, SkillSummary)> {
        let started = Instant::now();
        let caster = self.unit_snapshot(action.caster)?;
        let animate = self.config.enable_animations;

        self.state.transition(BattlePhase::RangeDisplay)?;
        self.state.activate(
            action.caster,
            Weapon::skill_stand_in(&action.skill_id, &action.skill_id, 0),
        );
        self.state.transition(BattlePhase::TargetSelection)?;
        self.state.current_target = action.targets.first().copied();
        self.state.transition(BattlePhase::BattleExecution)?;

        let SkillExecution {
            skill_name,
            power,
            mp_cost,
            effects,
        } = skills
            .execute_skill(action, self.roster.as_slice())
            .await
            .map_err(BattleError::from)?;
        self.state_manager
            .spend_mp(&mut self.roster, action.caster, mp_cost)?;

        let weapon = Weapon::skill_stand_in(&action.skill_id, &skill_name, power);
        self.state.current_weapon = Some(weapon.clone());
        self.state.transition(BattlePhase::Animation)?;

        let mut summary = SkillSummary {
            skill_id: action.skill_id.clone(),
            skill_name,
            ..SkillSummary::default()
        };
        let mut results = Vec::with_capacity(effects.len());

        for effect in effects {
            let target = effect.target();
            if !self.roster.contains(target) {
                tracing::warn!(
                    target: "battle::orchestrator",
                    skill = %action.skill_id,
                    unit = %target,
                    "skill effect targets an unknown unit, skipping"
                );
                continue;
            }

            let mut result = BattleResult::from_outcome(
                action.caster,
                target,
                weapon.clone(),
                DamageOutcome::default(),
                clock::now_millis(),
            );

            match effect {
                SkillEffect::Damage {
                    amount, critical, ..
                } => {
                    result.base_damage = amount;
                    result.final_damage = amount;
                    result.is_critical = critical;

                    let change = self.state_manager.apply_damage(
                        &mut self.roster,
                        Some(action.caster),
                        target,
                        amount,
                    )?;
                    if animate {
                        self.animate_hp_change(change).await;
                    }
                    summary.total_damage += change.previous_hp - change.current_hp;
                    result.target_defeated = change.defeated() && change.previous_hp > 0;

                    if let Some(victory) = &self.integrations.victory {
                        if let Err(err) = victory.record_damage(action.caster, target, amount) {
                            super::log_integration_failure(&err);
                        }
                    }

                    if result.target_defeated {
                        let defeat = DefeatContext {
                            attacker: &caster,
                            cause: LossCause::Skill {
                                caster: action.caster,
                                skill_id: action.skill_id.clone(),
                            },
                            recruitment_eligible: false,
                            animate,
                        };
                        self.resolve_defeat(defeat, target, &mut result).await?;
                    }
                }
                SkillEffect::Heal { amount, .. } => {
                    let change = self
                        .state_manager
                        .apply_healing(&mut self.roster, target, amount)?;
                    if animate {
                        self.animate_hp_change(change).await;
                    }
                    let healed = change.current_hp - change.previous_hp;
                    summary.total_healing += healed;
                    result.push_effect(AppliedEffect::Heal {
                        unit: target,
                        amount: healed,
                    });
                }
                SkillEffect::Status { name, .. } => {
                    summary.status_effects += 1;
                    result.push_effect(AppliedEffect::Status { unit: target, name });
                }
            }

            if !summary.affected_units.contains(&target) {
                summary.affected_units.push(target);
            }
            results.push(result);
        }

        self.state.transition(BattlePhase::Cleanup)?;
        self.grant_skill_experience(action, summary.affected_units.len(), &mut results);
        for result in &results {
            self.record_result(result.clone());
        }
        self.snapshot_roster();
        self.state_manager
            .mark_acted(&mut self.roster, action.caster)?;
        self.check_victory_conditions();

        summary.elapsed = started.elapsed();
        Ok((results, summary))
    }

    /// Experience for a cast is attributed to its last result.
    fn grant_skill_experience(
        &mut self,
        action: &SkillAction,
        affected: usize,
        results: &mut [BattleResult],
    ) {
        let Some(experience) = self.integrations.experience.clone() else {
            return;
        };
        let Ok(caster) = self.unit_snapshot(action.caster) else {
            return;
        };

        match experience.grant_skill_experience(&caster, &action.skill_id, affected) {
            Ok(grant) => {
                let Some(last) = results.last_mut() else {
                    return;
                };
                last.experience_gained = grant.amount;
                if let Some(level) = grant.new_level {
                    self.apply_level_up(action.caster, level, last);
                }
            }
            Err(err) => super::log_integration_failure(&err),
        }
    }
}
