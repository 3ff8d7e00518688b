use std::error::Error as StdError;
use std::sync::Arc;

use battle_core::{BattleError, BattleErrorKind};

use super::policy::{RecoveryDirective, RecoveryPolicy, StandardRecoveryPolicy};
use super::statistics::{ErrorRecord, ErrorStatistics};
use crate::clock;
use crate::error::RecoveryError;

/// Classifies failures, decides a recovery directive and keeps statistics.
///
/// The handler never touches orchestrator state; it only decides. Executing
/// the directive is the orchestrator's job.
pub struct ErrorHandler {
    policy: Arc<dyn RecoveryPolicy>,
    statistics: ErrorStatistics,
    max_retries: u32,
    retry_streak: Option<(BattleErrorKind, u32)>,
}

impl ErrorHandler {
    pub fn new(max_retries: u32) -> Self {
        Self::with_policy(Arc::new(StandardRecoveryPolicy), max_retries)
    }

    pub fn with_policy(policy: Arc<dyn RecoveryPolicy>, max_retries: u32) -> Self {
        Self {
            policy,
            statistics: ErrorStatistics::default(),
            max_retries,
            retry_streak: None,
        }
    }

    pub fn set_policy(&mut self, policy: Arc<dyn RecoveryPolicy>) {
        self.policy = policy;
    }

    /// Classifies an arbitrary error.
    ///
    /// A `BattleError` anywhere in the source chain keeps its kind; anything
    /// else becomes a battle-system error.
    pub fn classify(error: &(dyn StdError + 'static)) -> BattleError {
        let mut current: Option<&(dyn StdError + 'static)> = Some(error);
        while let Some(err) = current {
            if let Some(battle) = err.downcast_ref::<BattleError>() {
                return battle.clone();
            }
            current = err.source();
        }
        BattleError::system(error.to_string())
    }

    /// Decides a directive for `error` and records it.
    ///
    /// Consecutive retries for the same kind beyond `max_retries` escalate to
    /// [`RecoveryDirective::Reset`].
    pub fn handle(&mut self, error: &BattleError) -> Result<RecoveryDirective, RecoveryError> {
        let decided = match self.policy.decide(error) {
            Ok(directive) => directive,
            Err(err) => {
                self.statistics
                    .push(ErrorRecord::new(error, None, clock::now_millis()));
                return Err(err);
            }
        };

        let directive = self.escalate(error.kind, decided);
        if directive != decided {
            tracing::warn!(
                target: "battle::recovery",
                kind = %error.kind,
                max_retries = self.max_retries,
                "retry limit reached, escalating to reset"
            );
        }

        tracing::debug!(
            target: "battle::recovery",
            kind = %error.kind,
            directive = %directive,
            "error handled"
        );

        self.statistics
            .push(ErrorRecord::new(error, Some(directive), clock::now_millis()));
        Ok(directive)
    }

    /// Records an error without consulting the policy.
    ///
    /// Used for entry-point rejections (no directive) and for failures whose
    /// handling is fixed by the caller, such as skipped animations.
    pub fn record(&mut self, error: &BattleError, directive: Option<RecoveryDirective>) {
        tracing::debug!(
            target: "battle::recovery",
            kind = %error.kind,
            message = %error.message,
            "error recorded"
        );
        self.statistics
            .push(ErrorRecord::new(error, directive, clock::now_millis()));
    }

    pub fn statistics(&self) -> &ErrorStatistics {
        &self.statistics
    }

    pub fn clear_statistics(&mut self) {
        self.statistics = ErrorStatistics::default();
        self.retry_streak = None;
    }

    fn escalate(
        &mut self,
        kind: BattleErrorKind,
        directive: RecoveryDirective,
    ) -> RecoveryDirective {
        if directive != RecoveryDirective::Retry {
            self.retry_streak = None;
            return directive;
        }

        let attempts = match self.retry_streak {
            Some((streak_kind, count)) if streak_kind == kind => count + 1,
            _ => 1,
        };

        if attempts > self.max_retries {
            self.retry_streak = None;
            RecoveryDirective::Reset
        } else {
            self.retry_streak = Some((kind, attempts));
            RecoveryDirective::Retry
        }
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPolicy;

    impl RecoveryPolicy for BrokenPolicy {
        fn decide(&self, _error: &BattleError) -> Result<RecoveryDirective, RecoveryError> {
            Err(RecoveryError::Policy("unavailable".into()))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped")]
    struct Wrapper(#[source] BattleError);

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct Foreign;

    #[test]
    fn classify_finds_battle_errors_in_the_chain() {
        let wrapped = Wrapper(BattleError::weapon_broken("snapped"));
        assert_eq!(
            ErrorHandler::classify(&wrapped).kind,
            BattleErrorKind::WeaponBroken
        );

        let foreign = ErrorHandler::classify(&Foreign);
        assert_eq!(foreign.kind, BattleErrorKind::BattleSystemError);
        assert_eq!(foreign.message, "disk on fire");
    }

    #[test]
    fn handle_records_directive() {
        let mut handler = ErrorHandler::default();
        let directive = handler.handle(&BattleError::invalid_attacker("dead")).unwrap();

        assert_eq!(directive, RecoveryDirective::Cancel);
        let last = handler.statistics().last().unwrap();
        assert_eq!(last.directive, Some(RecoveryDirective::Cancel));
        assert_eq!(last.suggested_action, BattleErrorKind::InvalidAttacker.suggested_action());
    }

    #[test]
    fn repeated_retries_escalate() {
        let mut handler = ErrorHandler::new(2);
        let err = BattleError::damage_calculation("nan");

        assert_eq!(handler.handle(&err).unwrap(), RecoveryDirective::Retry);
        assert_eq!(handler.handle(&err).unwrap(), RecoveryDirective::Retry);
        assert_eq!(handler.handle(&err).unwrap(), RecoveryDirective::Reset);
        // streak restarts after escalation
        assert_eq!(handler.handle(&err).unwrap(), RecoveryDirective::Retry);
    }

    #[test]
    fn other_directives_break_the_streak() {
        let mut handler = ErrorHandler::new(1);
        let retry = BattleError::damage_calculation("nan");

        assert_eq!(handler.handle(&retry).unwrap(), RecoveryDirective::Retry);
        handler.handle(&BattleError::out_of_range("far")).unwrap();
        assert_eq!(handler.handle(&retry).unwrap(), RecoveryDirective::Retry);
    }

    #[test]
    fn failing_policy_is_reported_and_counted() {
        let mut handler = ErrorHandler::with_policy(Arc::new(BrokenPolicy), 3);
        assert!(handler.handle(&BattleError::system("x")).is_err());
        assert_eq!(handler.statistics().total, 1);
        assert_eq!(handler.statistics().last().unwrap().directive, None);
    }
}
