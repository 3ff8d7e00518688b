//! Tactical battle data types and combat rules.
//!
//! `battle-core` defines the canonical data model of a combat exchange
//! (units, weapons, results), the phase state machine, the error taxonomy and
//! the collaborator seams (range, targeting, damage). It performs no I/O and no
//! async work; orchestration lives in the `battle-runtime` crate.
pub mod combat;
pub mod context;
pub mod error;
pub mod phase;
pub mod state;

pub use combat::{
    AppliedEffect, BasicTargetSelector, BattleResult, CombatRolls, DamageCalculator,
    DamageError, DamageOutcome, DamageParams, DamageRequest, GridRangeCalculator, Modifier,
    ModifierKind, ModifierSource, RangeCalculator, StandardDamageCalculator, TargetError,
    TargetSelector, TargetingContext, apply_damage,
};
pub use context::BattleContext;
pub use error::{BattleError, BattleErrorKind, ErrorSeverity};
pub use phase::BattlePhase;
pub use state::{
    BossInfo, Durability, Element, Faction, MapData, Position, RangePattern, RangeShape, Roster,
    Unit, UnitId, UnitStats, Weapon, WeaponType,
};
