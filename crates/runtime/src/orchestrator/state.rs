use battle_core::{BattleError, BattlePhase, BattleResult, UnitId, Weapon};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Per-orchestrator view of the exchange in progress.
///
/// Invariant: `is_active` holds exactly when `current_attacker` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSystemState {
    pub phase: BattlePhase,
    pub current_attacker: Option<UnitId>,
    pub current_weapon: Option<Weapon>,
    pub current_target: Option<UnitId>,
    pub is_active: bool,
    pub is_animating: bool,
    pub last_battle_result: Option<BattleResult>,
}

impl BattleSystemState {
    pub fn is_idle(&self) -> bool {
        self.phase.is_idle()
    }

    pub(crate) fn activate(&mut self, attacker: UnitId, weapon: Weapon) {
        self.current_attacker = Some(attacker);
        self.current_weapon = Some(weapon);
        self.current_target = None;
        self.is_active = true;
    }

    /// Moves to `to`, rejecting anything but the next phase or a return to idle.
    pub(crate) fn transition(&mut self, to: BattlePhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(BattleError::system(format!(
                "illegal phase transition {} -> {}",
                self.phase, to
            )));
        }
        tracing::trace!(
            target: "battle::orchestrator",
            from = %self.phase,
            to = %to,
            "phase transition"
        );
        self.phase = to;
        Ok(())
    }

    /// Returns to idle, keeping the last result.
    pub(crate) fn reset_to_idle(&mut self) {
        let last_battle_result = self.last_battle_result.take();
        *self = Self {
            last_battle_result,
            ..Self::default()
        };
    }
}
