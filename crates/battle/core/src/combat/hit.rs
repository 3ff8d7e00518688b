//! Hit and critical checks.

use super::damage::DamageParams;

/// Hit chance in percent: weapon accuracy minus target evasion, clamped.
///
/// # Formula
///
/// ```text
/// hit_chance = accuracy - evasion
/// clamped to [min_hit_chance, max_hit_chance]
/// ```
pub fn calculate_hit_chance(accuracy: u32, evasion: u32, params: &DamageParams) -> u32 {
    let chance = i64::from(accuracy) - i64::from(evasion);
    chance.clamp(
        i64::from(params.min_hit_chance),
        i64::from(params.max_hit_chance),
    ) as u32
}

/// Returns true if a roll in `0..100` lands inside the hit chance.
pub fn check_hit(accuracy: u32, evasion: u32, roll: u32, params: &DamageParams) -> bool {
    roll < calculate_hit_chance(accuracy, evasion, params)
}

/// Returns true if a roll in `0..100` lands inside the critical rate.
pub fn check_critical(critical_rate: u32, roll: u32) -> bool {
    roll < critical_rate
}
