//! Diagnostic context attached to battle errors.

use crate::phase::BattlePhase;
use crate::state::UnitId;

/// Snapshot of the exchange at the point an error was raised.
///
/// Built per error for diagnostics and recovery decisions. The runtime keeps
/// a bounded copy of recent contexts in its error statistics; otherwise it is
/// discarded once the error is handled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleContext {
    pub attacker: Option<UnitId>,
    pub target: Option<UnitId>,
    /// Weapon id.
    pub weapon: Option<String>,
    pub phase: BattlePhase,
    pub error: Option<String>,
}

impl BattleContext {
    #[must_use]
    pub fn new(phase: BattlePhase) -> Self {
        Self {
            phase,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attacker(mut self, attacker: UnitId) -> Self {
        self.attacker = Some(attacker);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: UnitId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_weapon(mut self, weapon_id: impl Into<String>) -> Self {
        self.weapon = Some(weapon_id.into());
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
