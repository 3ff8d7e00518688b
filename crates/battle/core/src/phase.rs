//! Battle phase state machine.

/// Named step of a combat exchange.
///
/// Phases advance strictly in order:
///
/// ```text
/// idle → range_display → target_selection → battle_execution → animation
/// → cleanup → idle
/// ```
///
/// Cancellation and errors may return to `idle` from any non-idle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BattlePhase {
    #[default]
    Idle,
    RangeDisplay,
    TargetSelection,
    BattleExecution,
    Animation,
    Cleanup,
}

impl BattlePhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BattlePhase::Idle => "idle",
            BattlePhase::RangeDisplay => "range_display",
            BattlePhase::TargetSelection => "target_selection",
            BattlePhase::BattleExecution => "battle_execution",
            BattlePhase::Animation => "animation",
            BattlePhase::Cleanup => "cleanup",
        }
    }

    /// The phase that follows this one in a normal exchange.
    pub const fn next(&self) -> BattlePhase {
        match self {
            BattlePhase::Idle => BattlePhase::RangeDisplay,
            BattlePhase::RangeDisplay => BattlePhase::TargetSelection,
            BattlePhase::TargetSelection => BattlePhase::BattleExecution,
            BattlePhase::BattleExecution => BattlePhase::Animation,
            BattlePhase::Animation => BattlePhase::Cleanup,
            BattlePhase::Cleanup => BattlePhase::Idle,
        }
    }

    pub const fn is_idle(&self) -> bool {
        matches!(self, BattlePhase::Idle)
    }

    /// Returns true if `to` is a legal transition from this phase.
    ///
    /// Legal transitions are the single forward step, or a return to idle
    /// from any non-idle phase (cancel, error, completion).
    pub fn can_transition_to(&self, to: BattlePhase) -> bool {
        if to == self.next() {
            return true;
        }
        to.is_idle() && !self.is_idle()
    }
}

impl std::fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
