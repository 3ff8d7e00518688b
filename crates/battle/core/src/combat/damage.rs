//! Damage calculation seam and the standard formula.

use crate::error::BattleError;
use crate::state::{Unit, Weapon};

use super::hit::{check_critical, check_hit};
use super::modifier::{Modifier, ModifierSource};

/// Random rolls consumed by a single calculation, each in `0..100`.
///
/// Rolls are drawn by the caller so that calculators stay pure and a seeded
/// run is reproducible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatRolls {
    pub hit: u32,
    pub critical: u32,
}

impl CombatRolls {
    /// Rolls that always hit and never crit.
    pub const CERTAIN_HIT: Self = Self {
        hit: 0,
        critical: 99,
    };
}

/// Everything a calculator needs for one exchange.
#[derive(Clone, Copy, Debug)]
pub struct DamageRequest<'a> {
    pub attacker: &'a Unit,
    pub target: &'a Unit,
    /// Working weapon copy (job modification already applied).
    pub weapon: &'a Weapon,
    /// Merged modifiers: custom, then attacker job, then defender job.
    pub modifiers: &'a [Modifier],
    pub rolls: CombatRolls,
}

/// Result of a damage calculation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    pub base_damage: u32,
    /// Zero when evaded.
    pub final_damage: u32,
    pub is_critical: bool,
    pub is_evaded: bool,
    /// Every modifier that was applied, in order.
    pub modifiers: Vec<Modifier>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DamageError {
    #[error("a unit cannot attack itself")]
    SelfTarget,

    #[error("target is already defeated")]
    TargetDefeated,

    #[error("unsupported weapon: {0}")]
    UnsupportedWeapon(String),
}

impl From<DamageError> for BattleError {
    fn from(err: DamageError) -> Self {
        BattleError::damage_calculation(err.to_string())
    }
}

/// Numeric damage/accuracy/critical formula.
///
/// The orchestrator calls this exactly once per exchange.
pub trait DamageCalculator: Send + Sync {
    fn calculate(&self, request: &DamageRequest<'_>) -> Result<DamageOutcome, DamageError>;
}

/// Balance parameters for [`StandardDamageCalculator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageParams {
    /// Defense is divided by this before being subtracted.
    pub defense_divisor: u32,
    /// Extra damage on a critical hit, in percent.
    pub critical_bonus_percent: i32,
    /// Damage floor for a hit that connects.
    pub minimum: u32,
    pub min_hit_chance: u32,
    pub max_hit_chance: u32,
}

impl Default for DamageParams {
    fn default() -> Self {
        Self {
            defense_divisor: 2,
            critical_bonus_percent: 50,
            minimum: 1,
            min_hit_chance: 5,
            max_hit_chance: 100,
        }
    }
}

/// Reference formula.
///
/// # Formula
///
/// ```text
/// base   = weapon.attack_power + attacker.attack - target.defense / defense_divisor
/// value  = fold(modifiers, base)
/// if critical: value += value * critical_bonus_percent / 100
/// final  = max(value, minimum)      (0 when evaded)
/// ```
#[derive(Clone, Debug, Default)]
pub struct StandardDamageCalculator {
    params: DamageParams,
}

impl StandardDamageCalculator {
    pub fn new(params: DamageParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DamageParams {
        &self.params
    }
}

impl DamageCalculator for StandardDamageCalculator {
    fn calculate(&self, request: &DamageRequest<'_>) -> Result<DamageOutcome, DamageError> {
        let DamageRequest {
            attacker,
            target,
            weapon,
            modifiers,
            rolls,
        } = *request;

        if attacker.id == target.id {
            return Err(DamageError::SelfTarget);
        }
        if !target.is_alive() {
            return Err(DamageError::TargetDefeated);
        }

        let divisor = self.params.defense_divisor.max(1);
        let raw = weapon.attack_power.saturating_add(attacker.stats.attack);
        let base_damage = raw
            .saturating_sub(target.stats.defense / divisor)
            .max(self.params.minimum);

        let mut applied = modifiers.to_vec();

        let evaded = !check_hit(weapon.accuracy, target.stats.evasion, rolls.hit, &self.params);
        if evaded {
            return Ok(DamageOutcome {
                base_damage,
                final_damage: 0,
                is_critical: false,
                is_evaded: true,
                modifiers: applied,
            });
        }

        let mut value = modifiers.iter().fold(base_damage, |acc, m| m.apply(acc));

        let is_critical = check_critical(weapon.critical_rate, rolls.critical);
        if is_critical {
            let critical = Modifier::percent(
                ModifierSource::Calculator,
                "critical",
                self.params.critical_bonus_percent,
            );
            value = critical.apply(value);
            applied.push(critical);
        }

        Ok(DamageOutcome {
            base_damage,
            final_damage: value.max(self.params.minimum),
            is_critical,
            is_evaded: false,
            modifiers: applied,
        })
    }
}

/// Apply damage to current HP, flooring at zero.
pub fn apply_damage(current_hp: u32, damage: u32) -> u32 {
    current_hp.saturating_sub(damage)
}
