use std::error::Error as StdError;

use battle_core::{BattleContext, BattleError, BattlePhase};

use super::BattleOrchestrator;
use crate::events::BattleEvent;
use crate::recovery::{ErrorHandler, RecoveryDirective};

impl BattleOrchestrator {
    /// Stops everything and returns to a clean idle state.
    ///
    /// Animations are stopped, highlights and target selection cleared and
    /// the state machine reset (keeping the last result). Publishes
    /// `system-reset`.
    pub fn force_reset(&mut self) {
        tracing::warn!(
            target: "battle::orchestrator",
            phase = %self.state.phase,
            attacker = ?self.state.current_attacker,
            "forcing reset"
        );
        self.animator.stop_all();
        self.animator.clear_highlights();
        self.target_selector.clear();
        self.state.reset_to_idle();
        self.publish(BattleEvent::SystemReset);
    }

    /// Classifies an externally reported error and executes the directive
    /// chosen for it.
    ///
    /// Returns `None` if the recovery policy failed, in which case the
    /// orchestrator was force-reset and `critical-error` published.
    pub fn handle_manual_error(
        &mut self,
        error: &(dyn StdError + 'static),
        context: Option<BattleContext>,
    ) -> Option<RecoveryDirective> {
        let classified = ErrorHandler::classify(error);
        let context = context.unwrap_or_else(|| self.current_context(&classified));
        self.recover(&classified.with_context(context), false)
    }

    /// Records and publishes an entry-point rejection. State is left as is.
    pub(super) fn reject(&mut self, error: BattleError) -> BattleError {
        let error = self.contextualize(error);
        tracing::warn!(
            target: "battle::orchestrator",
            kind = %error.kind,
            message = %error.message,
            "request rejected"
        );
        self.error_handler.record(&error, None);
        self.publish(BattleEvent::BattleError {
            kind: error.kind,
            message: error.message.clone(),
            suggested_action: error.suggested_action().to_string(),
            directive: None,
        });
        error
    }

    /// Pipeline failure boundary: classify, recover, and end idle no matter what.
    pub(super) fn fail_pipeline(&mut self, error: BattleError) -> BattleError {
        let error = self.contextualize(error);
        tracing::error!(
            target: "battle::orchestrator",
            kind = %error.kind,
            message = %error.message,
            phase = %self.state.phase,
            "battle pipeline failed"
        );

        self.recover(&error, true);

        self.state.is_animating = false;
        self.animator.clear_highlights();
        self.target_selector.clear();
        self.state.reset_to_idle();
        error
    }

    fn recover(&mut self, error: &BattleError, in_pipeline: bool) -> Option<RecoveryDirective> {
        let directive = match self.error_handler.handle(error) {
            Ok(directive) => directive,
            Err(failure) => {
                tracing::error!(
                    target: "battle::recovery",
                    error = %failure,
                    original = %error,
                    "error handler failed"
                );
                self.force_reset();
                self.publish(BattleEvent::CriticalError {
                    message: format!("{failure} while handling {error}"),
                });
                return None;
            }
        };

        self.publish(BattleEvent::BattleError {
            kind: error.kind,
            message: error.message.clone(),
            suggested_action: error.suggested_action().to_string(),
            directive: Some(directive),
        });
        self.execute_directive(directive, in_pipeline);
        self.publish(BattleEvent::ErrorRecovered {
            kind: error.kind,
            directive,
        });
        Some(directive)
    }

    fn execute_directive(&mut self, directive: RecoveryDirective, in_pipeline: bool) {
        match directive {
            RecoveryDirective::Cancel | RecoveryDirective::Retry => self.cancel_attack(),
            RecoveryDirective::Reset => self.force_reset(),
            RecoveryDirective::Fallback if in_pipeline => self.cancel_attack(),
            RecoveryDirective::Fallback => self.fall_back_to_target_selection(),
            RecoveryDirective::Ignore => {}
        }
    }

    /// Keeps attacker and weapon, drops the target.
    ///
    /// Re-enters target selection through idle so no phase is skipped. If
    /// the attacker can no longer attack, the attack is cancelled instead.
    fn fall_back_to_target_selection(&mut self) {
        let (Some(attacker), Some(weapon)) = (
            self.state.current_attacker,
            self.state.current_weapon.clone(),
        ) else {
            return;
        };

        if self.state.phase == BattlePhase::TargetSelection {
            self.state.current_target = None;
            return;
        }

        let eligible = self
            .roster
            .get(attacker)
            .filter(|unit| unit.is_alive() && !unit.has_acted)
            .cloned();
        let Some(unit) = eligible else {
            self.cancel_attack();
            return;
        };

        self.target_selector.clear();
        self.state.reset_to_idle();
        if let Err(err) = self.enter_target_selection(&unit, weapon) {
            tracing::warn!(
                target: "battle::recovery",
                error = %err,
                "fallback could not re-enter target selection"
            );
            self.cancel_attack();
        }
    }

    fn contextualize(&self, error: BattleError) -> BattleError {
        if error.context().is_some() {
            return error;
        }
        let context = self.current_context(&error);
        error.with_context(context)
    }

    fn current_context(&self, error: &BattleError) -> BattleContext {
        BattleContext {
            attacker: self.state.current_attacker,
            target: self.state.current_target,
            weapon: self.state.current_weapon.as_ref().map(|w| w.id.clone()),
            phase: self.state.phase,
            error: Some(error.message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use battle_core::{Faction, Position, Unit, UnitId, UnitStats, Weapon, WeaponType};

    use super::*;
    use crate::BattleConfig;
    use crate::error::RecoveryError;
    use crate::events::EventKind;
    use crate::recovery::RecoveryPolicy;

    fn orchestrator() -> BattleOrchestrator {
        let mut orchestrator = BattleOrchestrator::builder()
            .config(BattleConfig::headless())
            .build()
            .unwrap();
        orchestrator.initialize(
            vec![
                Unit::new(
                    UnitId(1),
                    "Knight",
                    Faction::Player,
                    Position::new(0, 0),
                    UnitStats::new(100, 10, 12, 4),
                )
                .with_weapon(Weapon::new("sword", "Sword", WeaponType::Sword, 8)),
                Unit::new(
                    UnitId(2),
                    "Bandit",
                    Faction::Enemy,
                    Position::new(1, 0),
                    UnitStats::new(30, 0, 8, 2),
                ),
            ],
            None,
        );
        orchestrator
    }

    fn record_names(orchestrator: &BattleOrchestrator) -> Arc<Mutex<Vec<&'static str>>> {
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        orchestrator
            .events()
            .subscribe_all(move |event| sink.lock().unwrap().push(event.name()));
        names
    }

    #[test]
    fn manual_system_error_resets() {
        let mut orchestrator = orchestrator();
        orchestrator.initiate_attack(UnitId(1), None).unwrap();
        let names = record_names(&orchestrator);

        let directive = orchestrator.handle_manual_error(&BattleError::system("desync"), None);

        assert_eq!(directive, Some(RecoveryDirective::Reset));
        assert!(orchestrator.system_state().is_idle());
        assert!(!orchestrator.system_state().is_active);
        assert_eq!(
            *names.lock().unwrap(),
            vec!["battle-error", "system-reset", "error-recovered"]
        );
    }

    #[test]
    fn fallback_keeps_attacker_and_weapon() {
        let mut orchestrator = orchestrator();
        orchestrator.initiate_attack(UnitId(1), None).unwrap();

        let directive =
            orchestrator.handle_manual_error(&BattleError::out_of_range("moved away"), None);

        assert_eq!(directive, Some(RecoveryDirective::Fallback));
        let state = orchestrator.system_state();
        assert_eq!(state.phase, BattlePhase::TargetSelection);
        assert_eq!(state.current_attacker, Some(UnitId(1)));
        assert_eq!(state.current_target, None);
        assert_eq!(state.current_weapon.as_ref().map(|w| w.id.as_str()), Some("sword"));
    }

    #[test]
    fn ignore_changes_nothing() {
        let mut orchestrator = orchestrator();
        orchestrator.initiate_attack(UnitId(1), None).unwrap();
        let before = orchestrator.system_state().clone();

        let directive =
            orchestrator.handle_manual_error(&BattleError::animation_failed("sprite"), None);

        assert_eq!(directive, Some(RecoveryDirective::Ignore));
        assert_eq!(orchestrator.system_state(), &before);
    }

    #[test]
    fn failing_policy_forces_reset_and_reports_critical() {
        struct Broken;
        impl RecoveryPolicy for Broken {
            fn decide(&self, _error: &BattleError) -> Result<RecoveryDirective, RecoveryError> {
                Err(RecoveryError::Policy("lookup table missing".into()))
            }
        }

        let mut orchestrator = orchestrator();
        orchestrator.set_recovery_policy(Arc::new(Broken));
        orchestrator.initiate_attack(UnitId(1), None).unwrap();
        let critical = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&critical);
        orchestrator
            .events()
            .subscribe(EventKind::CriticalError, move |_| *counter.lock().unwrap() += 1);

        let directive =
            orchestrator.handle_manual_error(&BattleError::invalid_target("ally"), None);

        assert_eq!(directive, None);
        assert_eq!(*critical.lock().unwrap(), 1);
        assert!(orchestrator.system_state().is_idle());
    }

    #[test]
    fn manual_errors_carry_context() {
        let mut orchestrator = orchestrator();
        orchestrator.initiate_attack(UnitId(1), None).unwrap();

        orchestrator.handle_manual_error(&BattleError::weapon_broken("snapped"), None);

        let record = orchestrator.error_statistics().last().unwrap();
        let context = record.context.as_ref().unwrap();
        assert_eq!(context.attacker, Some(UnitId(1)));
        assert_eq!(context.phase, BattlePhase::TargetSelection);
        assert_eq!(record.directive, Some(RecoveryDirective::Cancel));
    }
}
