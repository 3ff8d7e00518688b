use battle_core::{BattleResult, Modifier, Unit, Weapon};

use crate::error::IntegrationError;

/// Class-based adjustments to an exchange.
///
/// Attacker modifiers are merged after caller-supplied modifiers and before
/// defender modifiers.
pub trait JobSystem: Send + Sync {
    fn attack_modifiers(
        &self,
        attacker: &Unit,
        weapon: &Weapon,
    ) -> Result<Vec<Modifier>, IntegrationError>;

    fn defense_modifiers(&self, defender: &Unit) -> Result<Vec<Modifier>, IntegrationError>;

    /// Returns a modified copy of the weapon, or `None` to use it unchanged.
    fn modify_weapon(&self, _attacker: &Unit, _weapon: &Weapon) -> Option<Weapon> {
        None
    }

    fn post_process(&self, _result: &mut BattleResult) -> Result<(), IntegrationError> {
        Ok(())
    }
}
