//! The battle orchestrator.
//!
//! [`BattleOrchestrator`] owns the roster, the phase state machine and the
//! collaborators, and sequences one exchange at a time:
//!
//! ```text
//! idle → range_display → target_selection → battle_execution → animation
//! → cleanup → idle
//! ```
//!
//! The public surface is split by concern:
//! - attack flow: `initiate_attack`, `show_attack_range`, `select_target`,
//!   `cancel_attack`, `can_attack`
//! - resolution pipeline: the nine ordered steps behind `select_target`
//! - skills and AI: `execute_skill_action`, `execute_ai_action`
//! - recovery: `handle_manual_error`, `force_reset`
mod ai;
mod attack;
mod pipeline;
mod reset;
mod skill;
mod state;

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::{
    BasicTargetSelector, BattleResult, DamageCalculator, Faction, GridRangeCalculator, MapData,
    Position, RangeCalculator, RangePattern, Roster, StandardDamageCalculator, TargetSelector, Unit,
    UnitId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

pub use ai::{AiAction, AiActionKind, AiActionOutcome};
pub use pipeline::{BattleOptions, FALLBACK_HIT_EXPERIENCE, FALLBACK_KILL_EXPERIENCE};
pub use skill::{SkillActionResult, SkillSummary};
pub use state::BattleSystemState;

use crate::config::{BattleConfig, ConfigError};
use crate::error::IntegrationError;
use crate::events::{BattleEvent, EventBus};
use crate::integrations::{
    AiSystem, AnimationSettings, Animator, BattleOutcome, CharacterLossManager, ExperienceSystem,
    Integrations, JobSystem, NoopAnimator, RecruitmentSystem, SkillSystem, VictoryConditionSystem,
};
use crate::recovery::{ErrorHandler, ErrorStatistics, RecoveryPolicy};
use crate::state_manager::{BattleStateManager, CombatTally};

type RangeKey = (UnitId, Position, String, RangePattern);

/// Invariant violations found by [`BattleOrchestrator::validate_system_integrity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub violations: Vec<String>,
}

impl IntegrityReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Phase-driven coordinator for tactical combat exchanges.
///
/// At most one exchange is in flight per orchestrator. Optional integrations
/// are consulted when attached and skipped otherwise.
pub struct BattleOrchestrator {
    config: BattleConfig,
    state: BattleSystemState,
    roster: Roster,
    map: Option<MapData>,

    range_calculator: Arc<dyn RangeCalculator>,
    target_selector: Box<dyn TargetSelector>,
    damage_calculator: Arc<dyn DamageCalculator>,
    animator: Arc<dyn Animator>,
    integrations: Integrations,

    state_manager: BattleStateManager,
    error_handler: ErrorHandler,
    events: EventBus,

    rng: StdRng,
    range_cache: HashMap<RangeKey, Vec<Position>>,
    turn: u32,
    outcome: Option<BattleOutcome>,
}

impl BattleOrchestrator {
    /// Create a new orchestrator builder
    pub fn builder() -> BattleOrchestratorBuilder {
        BattleOrchestratorBuilder::new()
    }

    // ----- lifecycle ---------------------------------------------------------

    /// Loads the units and optional map for a new battle.
    ///
    /// Any exchange in progress is abandoned without notification. History,
    /// tallies and the range cache are cleared.
    pub fn initialize(&mut self, units: Vec<Unit>, map: Option<MapData>) {
        self.animator.stop_all();
        self.animator.clear_highlights();
        self.target_selector.clear();
        self.state = BattleSystemState::default();
        self.roster = Roster::new(units);
        self.map = map;
        self.range_cache.clear();
        self.state_manager.reset();
        self.turn = 1;
        self.outcome = None;
        self.animator.configure(self.animation_settings());

        tracing::info!(
            target: "battle::orchestrator",
            units = self.roster.len(),
            has_map = self.map.is_some(),
            integrations = ?self.integrations,
            "battle initialized"
        );
    }

    /// Tears the orchestrator down: idle, inactive, no units, no history and
    /// no subscribers. Integrations stay attached.
    pub fn destroy(&mut self) {
        self.animator.stop_all();
        self.animator.clear_highlights();
        self.target_selector.clear();
        self.state = BattleSystemState::default();
        self.roster.clear();
        self.map = None;
        self.range_cache.clear();
        self.state_manager.reset();
        self.error_handler.clear_statistics();
        self.events.clear();
        self.turn = 1;
        self.outcome = None;

        tracing::debug!(target: "battle::orchestrator", "orchestrator destroyed");
    }

    // ----- wiring ------------------------------------------------------------

    pub fn set_recruitment_system(&mut self, system: Arc<dyn RecruitmentSystem>) {
        self.integrations.recruitment = Some(system);
    }

    pub fn set_character_loss_manager(&mut self, manager: Arc<dyn CharacterLossManager>) {
        self.integrations.character_loss = Some(manager);
    }

    pub fn set_skill_system(&mut self, system: Arc<dyn SkillSystem>) {
        self.integrations.skill = Some(system);
    }

    pub fn set_experience_system(&mut self, system: Arc<dyn ExperienceSystem>) {
        self.integrations.experience = Some(system);
    }

    pub fn set_job_system(&mut self, system: Arc<dyn JobSystem>) {
        self.integrations.job = Some(system);
    }

    pub fn set_ai_system_manager(&mut self, system: Arc<dyn AiSystem>) {
        self.integrations.ai = Some(system);
    }

    pub fn set_victory_condition_system(&mut self, system: Arc<dyn VictoryConditionSystem>) {
        self.integrations.victory = Some(system);
    }

    pub fn set_animator(&mut self, animator: Arc<dyn Animator>) {
        animator.configure(self.animation_settings());
        self.animator = animator;
    }

    pub fn set_recovery_policy(&mut self, policy: Arc<dyn RecoveryPolicy>) {
        self.error_handler.set_policy(policy);
    }

    pub fn has_recruitment_system(&self) -> bool {
        self.integrations.recruitment.is_some()
    }

    pub fn has_character_loss_manager(&self) -> bool {
        self.integrations.character_loss.is_some()
    }

    pub fn has_skill_system(&self) -> bool {
        self.integrations.skill.is_some()
    }

    pub fn has_experience_system(&self) -> bool {
        self.integrations.experience.is_some()
    }

    pub fn has_job_system(&self) -> bool {
        self.integrations.job.is_some()
    }

    pub fn has_ai_system_manager(&self) -> bool {
        self.integrations.ai.is_some()
    }

    pub fn has_victory_condition_system(&self) -> bool {
        self.integrations.victory.is_some()
    }

    // ----- introspection -----------------------------------------------------

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn system_state(&self) -> &BattleSystemState {
        &self.state
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn units(&self) -> &[Unit] {
        self.roster.as_slice()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.roster.get(id)
    }

    pub fn map(&self) -> Option<&MapData> {
        self.map.as_ref()
    }

    /// The most recent `limit` results (all when `None`), oldest first.
    pub fn battle_history(&self, limit: Option<usize>) -> Vec<BattleResult> {
        self.state_manager.history(limit)
    }

    pub fn clear_battle_history(&mut self) {
        self.state_manager.clear_history();
    }

    pub fn export_history_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.state_manager.history(None))
    }

    pub fn error_statistics(&self) -> &ErrorStatistics {
        self.error_handler.statistics()
    }

    pub fn tally(&self, unit: UnitId) -> CombatTally {
        self.state_manager.tally(unit)
    }

    /// Victory or defeat, once decided by the victory-condition integration.
    pub fn battle_outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    pub fn advance_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    /// Clears `has_acted`/`has_moved` for one faction at the start of its phase.
    pub fn reset_turn_flags(&mut self, faction: Faction) {
        self.roster.reset_turn_flags(faction);
    }

    pub fn validate_system_integrity(&self) -> IntegrityReport {
        let mut violations = Vec::new();
        let state = &self.state;

        if state.is_active != state.current_attacker.is_some() {
            violations.push(format!(
                "is_active={} but current_attacker={:?}",
                state.is_active, state.current_attacker
            ));
        }
        if state.is_idle() && state.current_target.is_some() {
            violations.push("idle with a current target".to_string());
        }
        if !state.is_idle() && !state.is_active {
            violations.push(format!("phase {} without an active battle", state.phase));
        }
        if let Some(attacker) = state.current_attacker {
            if !self.roster.contains(attacker) {
                violations.push(format!("current attacker {attacker} is not in the roster"));
            }
        }
        if self.state_manager.history_len() > self.state_manager.history_limit() {
            violations.push("history exceeds its limit".to_string());
        }
        if !self.config.enable_result_caching && !self.range_cache.is_empty() {
            violations.push("range cache populated while caching is disabled".to_string());
        }

        if !violations.is_empty() {
            tracing::warn!(
                target: "battle::orchestrator",
                count = violations.len(),
                "integrity check failed"
            );
        }
        IntegrityReport { violations }
    }

    // ----- internals shared by the submodules --------------------------------

    fn animation_settings(&self) -> AnimationSettings {
        AnimationSettings {
            speed: self.config.battle_speed,
            timeout: self.config.animation_timeout,
        }
    }

    fn publish(&self, event: BattleEvent) {
        self.events.publish(event);
    }
}

fn log_integration_failure(err: &IntegrationError) {
    tracing::warn!(
        target: "battle::integrations",
        system = %err.system,
        error = %err.message,
        "integration call failed, continuing"
    );
}

/// Builder for [`BattleOrchestrator`].
pub struct BattleOrchestratorBuilder {
    config: BattleConfig,
    range_calculator: Option<Arc<dyn RangeCalculator>>,
    target_selector: Option<Box<dyn TargetSelector>>,
    damage_calculator: Option<Arc<dyn DamageCalculator>>,
    animator: Option<Arc<dyn Animator>>,
    recovery_policy: Option<Arc<dyn RecoveryPolicy>>,
    integrations: Integrations,
    events: Option<EventBus>,
}

impl BattleOrchestratorBuilder {
    fn new() -> Self {
        Self {
            config: BattleConfig::default(),
            range_calculator: None,
            target_selector: None,
            damage_calculator: None,
            animator: None,
            recovery_policy: None,
            integrations: Integrations::default(),
            events: None,
        }
    }

    /// Override configuration
    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn range_calculator(mut self, calculator: impl RangeCalculator + 'static) -> Self {
        self.range_calculator = Some(Arc::new(calculator));
        self
    }

    pub fn target_selector(mut self, selector: impl TargetSelector + 'static) -> Self {
        self.target_selector = Some(Box::new(selector));
        self
    }

    pub fn damage_calculator(mut self, calculator: impl DamageCalculator + 'static) -> Self {
        self.damage_calculator = Some(Arc::new(calculator));
        self
    }

    pub fn animator(mut self, animator: Arc<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn recovery_policy(mut self, policy: Arc<dyn RecoveryPolicy>) -> Self {
        self.recovery_policy = Some(policy);
        self
    }

    /// Attach a set of integrations at construction time.
    pub fn integrations(mut self, integrations: Integrations) -> Self {
        self.integrations = integrations;
        self
    }

    /// Attach a ready-made job system.
    pub fn job_system(mut self, system: Arc<dyn JobSystem>) -> Self {
        self.integrations.job = Some(system);
        self
    }

    /// Share an existing event bus instead of creating one.
    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<BattleOrchestrator, ConfigError> {
        self.config.validate()?;

        let events = self.events.unwrap_or_default();
        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let error_handler = match self.recovery_policy {
            Some(policy) => ErrorHandler::with_policy(policy, self.config.max_retries),
            None => ErrorHandler::new(self.config.max_retries),
        };

        let mut orchestrator = BattleOrchestrator {
            state: BattleSystemState::default(),
            roster: Roster::default(),
            map: None,
            range_calculator: self
                .range_calculator
                .unwrap_or_else(|| Arc::new(GridRangeCalculator)),
            target_selector: self
                .target_selector
                .unwrap_or_else(|| Box::new(BasicTargetSelector::new())),
            damage_calculator: self
                .damage_calculator
                .unwrap_or_else(|| Arc::new(StandardDamageCalculator::default())),
            animator: Arc::new(NoopAnimator),
            integrations: self.integrations,
            state_manager: BattleStateManager::new(events.clone(), self.config.history_limit),
            error_handler,
            events,
            rng,
            range_cache: HashMap::new(),
            turn: 1,
            outcome: None,
            config: self.config,
        };
        orchestrator.set_animator(self.animator.unwrap_or_else(|| Arc::new(NoopAnimator)));

        Ok(orchestrator)
    }
}

impl Default for BattleOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
