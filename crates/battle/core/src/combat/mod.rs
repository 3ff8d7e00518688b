//! Combat collaborators consumed by the orchestrator.
//!
//! # Architecture
//!
//! - **Seams as traits**: [`RangeCalculator`], [`TargetSelector`] and
//!   [`DamageCalculator`] are injected into the orchestrator
//! - **Pure Functions**: calculators receive their random rolls from the caller
//! - **Reference implementations**: [`GridRangeCalculator`],
//!   [`BasicTargetSelector`] and [`StandardDamageCalculator`] keep a headless
//!   battle runnable without any host-specific code

pub mod damage;
pub mod hit;
pub mod modifier;
pub mod range;
pub mod result;
pub mod targeting;

pub use damage::{
    CombatRolls, DamageCalculator, DamageError, DamageOutcome, DamageParams, DamageRequest,
    StandardDamageCalculator, apply_damage,
};
pub use hit::{calculate_hit_chance, check_critical, check_hit};
pub use modifier::{Modifier, ModifierKind, ModifierSource};
pub use range::{GridRangeCalculator, RangeCalculator};
pub use result::{AppliedEffect, BattleResult};
pub use targeting::{BasicTargetSelector, TargetError, TargetSelector, TargetingContext};
