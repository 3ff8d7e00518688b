//! Shared fixtures for orchestrator integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use battle_core::{
    BattleResult, BossInfo, DamageCalculator, DamageError, DamageOutcome, DamageRequest, Faction,
    Position, Unit, UnitId, UnitStats, Weapon, WeaponType,
};
use battle_runtime::{
    AiActionType, AiSystem, AnimationError, Animator, BattleConfig, BattleEvent,
    BattleOrchestrator, BattleOutcome, CharacterLossManager, ExperienceGrant, ExperienceSystem,
    IntegrationError, IntegrationKind, LossCause, RecruitmentOutcome, RecruitmentSystem,
    SkillAction, SkillExecution, SkillSystem, SoundCue, VictoryConditionSystem,
};

pub const KNIGHT: UnitId = UnitId(1);
pub const BANDIT: UnitId = UnitId(2);
pub const SQUIRE: UnitId = UnitId(3);
pub const CHIEF: UnitId = UnitId(4);

/// Knight (player, 100 HP) next to a Bandit (enemy, 30 HP); a Squire
/// (player, 20 HP) next to the Bandit; a boss out of everyone's reach.
pub fn units() -> Vec<Unit> {
    vec![
        Unit::new(
            KNIGHT,
            "Knight",
            Faction::Player,
            Position::new(0, 0),
            UnitStats::new(100, 10, 12, 4),
        )
        .with_weapon(Weapon::new("sword", "Sword", WeaponType::Sword, 8))
        .with_job("knight"),
        Unit::new(
            BANDIT,
            "Bandit",
            Faction::Enemy,
            Position::new(1, 0),
            UnitStats::new(30, 0, 8, 2),
        )
        .with_weapon(Weapon::new("axe", "Axe", WeaponType::Axe, 9)),
        Unit::new(
            SQUIRE,
            "Squire",
            Faction::Player,
            Position::new(2, 0),
            UnitStats::new(20, 12, 6, 1),
        )
        .with_weapon(Weapon::new("spear", "Spear", WeaponType::Spear, 6)),
        Unit::new(
            CHIEF,
            "Chief",
            Faction::Enemy,
            Position::new(3, 0),
            UnitStats::new(50, 0, 10, 5),
        )
        .with_boss(BossInfo {
            name: "Bandit Chief".to_string(),
            rose_essence: 5,
        }),
    ]
}

pub fn headless() -> BattleConfig {
    BattleConfig {
        rng_seed: Some(42),
        ..BattleConfig::headless()
    }
}

pub fn animated() -> BattleConfig {
    BattleConfig {
        rng_seed: Some(42),
        enable_sound_effects: true,
        ..BattleConfig::default()
    }
}

pub fn orchestrator(
    config: BattleConfig,
    damage: impl DamageCalculator + 'static,
) -> BattleOrchestrator {
    let mut orchestrator = BattleOrchestrator::builder()
        .config(config)
        .damage_calculator(damage)
        .build()
        .expect("valid config");
    orchestrator.initialize(units(), None);
    orchestrator
}

/// Records event names in publish order.
pub fn event_log(orchestrator: &BattleOrchestrator) -> Arc<Mutex<Vec<&'static str>>> {
    let names = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&names);
    orchestrator
        .events()
        .subscribe_all(move |event: &BattleEvent| sink.lock().unwrap().push(event.name()));
    names
}

// ----- damage ---------------------------------------------------------------

/// Deals a fixed amount, folding modifiers over it in order.
pub struct FixedDamage {
    pub amount: u32,
    pub evaded: bool,
}

impl FixedDamage {
    pub fn hit(amount: u32) -> Self {
        Self {
            amount,
            evaded: false,
        }
    }

    pub fn miss() -> Self {
        Self {
            amount: 0,
            evaded: true,
        }
    }
}

impl DamageCalculator for FixedDamage {
    fn calculate(&self, request: &DamageRequest<'_>) -> Result<DamageOutcome, DamageError> {
        if self.evaded {
            return Ok(DamageOutcome {
                base_damage: self.amount,
                final_damage: 0,
                is_critical: false,
                is_evaded: true,
                modifiers: request.modifiers.to_vec(),
            });
        }
        let final_damage = request
            .modifiers
            .iter()
            .fold(self.amount, |acc, m| m.apply(acc));
        Ok(DamageOutcome {
            base_damage: self.amount,
            final_damage,
            is_critical: false,
            is_evaded: false,
            modifiers: request.modifiers.to_vec(),
        })
    }
}

/// Always fails.
pub struct BrokenDamage;

impl DamageCalculator for BrokenDamage {
    fn calculate(&self, _request: &DamageRequest<'_>) -> Result<DamageOutcome, DamageError> {
        Err(DamageError::UnsupportedWeapon("test".to_string()))
    }
}

// ----- animator -------------------------------------------------------------

#[derive(Default)]
pub struct RecordingAnimator {
    pub calls: Mutex<Vec<String>>,
    pub fail_stage: Option<&'static str>,
}

impl RecordingAnimator {
    pub fn failing_at(stage: &'static str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_stage: Some(stage),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn step(&self, stage: &'static str) -> Result<(), AnimationError> {
        self.log(stage);
        if self.fail_stage == Some(stage) {
            return Err(AnimationError::playback(stage, "missing sprite"));
        }
        Ok(())
    }
}

#[async_trait]
impl Animator for RecordingAnimator {
    async fn play_attack(
        &self,
        _attacker: &Unit,
        _target: &Unit,
        _weapon: &Weapon,
    ) -> Result<(), AnimationError> {
        self.step("attack")
    }

    async fn play_hit_effect(
        &self,
        _target: &Unit,
        _is_critical: bool,
    ) -> Result<(), AnimationError> {
        self.step("hit")
    }

    async fn show_damage(
        &self,
        _target: &Unit,
        _amount: u32,
        _is_critical: bool,
    ) -> Result<(), AnimationError> {
        self.step("damage")
    }

    async fn animate_hp_change(
        &self,
        _unit: &Unit,
        _from: u32,
        _to: u32,
    ) -> Result<(), AnimationError> {
        self.step("hp")
    }

    async fn play_defeat(&self, _unit: &Unit) -> Result<(), AnimationError> {
        self.step("defeat")
    }

    fn highlight_range(&self, tiles: &[Position]) {
        self.log(format!("highlight:{}", tiles.len()));
    }

    fn clear_highlights(&self) {
        self.log("clear");
    }

    fn stop_all(&self) {
        self.log("stop");
    }

    fn play_sound(&self, cue: SoundCue) {
        self.log(format!("sound:{cue:?}"));
    }
}

// ----- integrations ---------------------------------------------------------

pub struct ScriptedRecruitment {
    pub eligible: bool,
    pub recruit: bool,
    pub planned: Mutex<Vec<u32>>,
}

impl ScriptedRecruitment {
    pub fn new(eligible: bool, recruit: bool) -> Self {
        Self {
            eligible,
            recruit,
            planned: Mutex::new(Vec::new()),
        }
    }
}

impl RecruitmentSystem for ScriptedRecruitment {
    fn check_eligibility(
        &self,
        _attacker: &Unit,
        target: &Unit,
        planned_damage: u32,
        _turn: u32,
    ) -> Result<bool, IntegrationError> {
        // eligibility is checked before damage lands
        assert!(target.is_alive());
        self.planned.lock().unwrap().push(planned_damage);
        Ok(self.eligible)
    }

    fn process_attempt(
        &self,
        _attacker: &Unit,
        _target: &Unit,
        _turn: u32,
    ) -> Result<RecruitmentOutcome, IntegrationError> {
        Ok(RecruitmentOutcome {
            recruited: self.recruit,
        })
    }
}

#[derive(Default)]
pub struct RecordingLoss {
    pub lost: Mutex<Vec<(UnitId, LossCause)>>,
    pub snapshots: Mutex<usize>,
}

#[async_trait]
impl CharacterLossManager for RecordingLoss {
    async fn process_character_loss(
        &self,
        unit: &Unit,
        cause: &LossCause,
    ) -> Result<(), IntegrationError> {
        self.lost.lock().unwrap().push((unit.id, cause.clone()));
        Ok(())
    }

    fn record_state_snapshot(&self, _units: &[Unit]) -> Result<(), IntegrationError> {
        *self.snapshots.lock().unwrap() += 1;
        Ok(())
    }
}

/// Grants a fixed amount and optionally a level.
pub struct FixedExperience {
    pub amount: u32,
    pub level_up: bool,
}

impl ExperienceSystem for FixedExperience {
    fn grant_battle_experience(
        &self,
        attacker: &Unit,
        _target: &Unit,
        _result: &BattleResult,
    ) -> Result<ExperienceGrant, IntegrationError> {
        Ok(ExperienceGrant {
            amount: self.amount,
            new_level: self.level_up.then_some(attacker.level + 1),
        })
    }

    fn grant_skill_experience(
        &self,
        _caster: &Unit,
        _skill_id: &str,
        affected: usize,
    ) -> Result<ExperienceGrant, IntegrationError> {
        Ok(ExperienceGrant {
            amount: self.amount * affected as u32,
            new_level: None,
        })
    }
}

pub struct FailingExperience;

impl ExperienceSystem for FailingExperience {
    fn grant_battle_experience(
        &self,
        _attacker: &Unit,
        _target: &Unit,
        _result: &BattleResult,
    ) -> Result<ExperienceGrant, IntegrationError> {
        Err(IntegrationError::new(IntegrationKind::Experience, "table missing"))
    }

    fn grant_skill_experience(
        &self,
        _caster: &Unit,
        _skill_id: &str,
        _affected: usize,
    ) -> Result<ExperienceGrant, IntegrationError> {
        Err(IntegrationError::new(IntegrationKind::Experience, "table missing"))
    }
}

/// Returns a canned execution for any usable skill.
pub struct ScriptedSkills {
    pub execution: SkillExecution,
    pub usable: bool,
}

#[async_trait]
impl SkillSystem for ScriptedSkills {
    fn can_use_skill(&self, _caster: &Unit, _skill_id: &str) -> bool {
        self.usable
    }

    async fn execute_skill(
        &self,
        _action: &SkillAction,
        _units: &[Unit],
    ) -> Result<SkillExecution, IntegrationError> {
        Ok(self.execution.clone())
    }
}

#[derive(Default)]
pub struct RecordingAi {
    pub completed: Mutex<Vec<(UnitId, AiActionType, bool)>>,
}

impl AiSystem for RecordingAi {
    fn on_action_complete(
        &self,
        unit: UnitId,
        action: AiActionType,
        success: bool,
    ) -> Result<(), IntegrationError> {
        self.completed.lock().unwrap().push((unit, action, success));
        Ok(())
    }
}

/// Victory once every enemy is down.
#[derive(Default)]
pub struct EnemyWipe {
    pub bosses: Mutex<Vec<UnitId>>,
    pub enemies: Mutex<Vec<UnitId>>,
    pub damage: Mutex<Vec<(UnitId, UnitId, u32)>>,
}

impl VictoryConditionSystem for EnemyWipe {
    fn on_boss_defeated(&self, boss: &Unit) -> Result<(), IntegrationError> {
        self.bosses.lock().unwrap().push(boss.id);
        Ok(())
    }

    fn on_enemy_defeated(&self, enemy: &Unit) -> Result<(), IntegrationError> {
        self.enemies.lock().unwrap().push(enemy.id);
        Ok(())
    }

    fn record_damage(
        &self,
        attacker: UnitId,
        target: UnitId,
        amount: u32,
    ) -> Result<(), IntegrationError> {
        self.damage.lock().unwrap().push((attacker, target, amount));
        Ok(())
    }

    fn check_conditions(
        &self,
        units: &[Unit],
        _turn: u32,
    ) -> Result<Option<BattleOutcome>, IntegrationError> {
        let enemies_left = units
            .iter()
            .any(|u| u.faction == Faction::Enemy && u.is_alive());
        Ok((!enemies_left).then_some(BattleOutcome::Victory))
    }
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
