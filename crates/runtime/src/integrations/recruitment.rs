use battle_core::Unit;

use crate::error::IntegrationError;

/// Result of a conversion attempt on a defeated target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecruitmentOutcome {
    pub recruited: bool,
}

/// Decides whether defeated enemies join as NPCs.
///
/// Eligibility is checked before damage is applied, using the damage the
/// attacker is about to deal; the attempt itself runs only if the target was
/// defeated and was eligible.
pub trait RecruitmentSystem: Send + Sync {
    fn check_eligibility(
        &self,
        attacker: &Unit,
        target: &Unit,
        planned_damage: u32,
        turn: u32,
    ) -> Result<bool, IntegrationError>;

    fn process_attempt(
        &self,
        attacker: &Unit,
        target: &Unit,
        turn: u32,
    ) -> Result<RecruitmentOutcome, IntegrationError>;
}
