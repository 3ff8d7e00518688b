//! Orchestrator configuration.
use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options recognized by the battle orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Play attack/hit/defeat animations. When false, playback is skipped entirely.
    pub enable_animations: bool,
    pub enable_sound_effects: bool,
    /// Playback speed multiplier forwarded to the animator.
    pub battle_speed: f32,
    /// Log every recorded battle result at info level.
    pub enable_battle_logging: bool,
    /// Hint forwarded to the animator; not enforced by the orchestrator.
    #[serde(with = "duration_ms")]
    pub animation_timeout: Duration,
    /// Cache attack ranges per attacker position and weapon.
    pub enable_result_caching: bool,
    /// Maximum number of results kept in history (oldest dropped first).
    pub history_limit: usize,
    /// Consecutive retry directives for one error kind before escalating to reset.
    pub max_retries: u32,
    /// Seed for combat rolls. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            enable_animations: true,
            enable_sound_effects: true,
            battle_speed: 1.0,
            enable_battle_logging: false,
            animation_timeout: Duration::from_millis(5000),
            enable_result_caching: true,
            history_limit: 100,
            max_retries: 3,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("battle_speed must be positive (got {0})")]
    InvalidSpeed(f32),

    #[error("history_limit must be at least 1")]
    ZeroHistoryLimit,
}

impl BattleConfig {
    /// Headless preset: no animations, no sound.
    pub fn headless() -> Self {
        Self {
            enable_animations: false,
            enable_sound_effects: false,
            ..Self::default()
        }
    }

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_ENABLE_ANIMATIONS` - `true`/`false` (default: true)
    /// - `BATTLE_ENABLE_SOUND` - `true`/`false` (default: true)
    /// - `BATTLE_SPEED` - playback multiplier (default: 1.0)
    /// - `BATTLE_LOGGING` - `true`/`false` (default: false)
    /// - `BATTLE_ANIMATION_TIMEOUT_MS` - animation timeout hint (default: 5000)
    /// - `BATTLE_RESULT_CACHING` - `true`/`false` (default: true)
    /// - `BATTLE_HISTORY_LIMIT` - results kept in history (default: 100)
    /// - `BATTLE_MAX_RETRIES` - retry escalation threshold (default: 3)
    /// - `BATTLE_RNG_SEED` - deterministic roll seed (default: unset)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = read_env::<bool>("BATTLE_ENABLE_ANIMATIONS") {
            config.enable_animations = value;
        }
        if let Some(value) = read_env::<bool>("BATTLE_ENABLE_SOUND") {
            config.enable_sound_effects = value;
        }
        if let Some(value) = read_env::<f32>("BATTLE_SPEED") {
            config.battle_speed = value;
        }
        if let Some(value) = read_env::<bool>("BATTLE_LOGGING") {
            config.enable_battle_logging = value;
        }
        if let Some(ms) = read_env::<u64>("BATTLE_ANIMATION_TIMEOUT_MS") {
            config.animation_timeout = Duration::from_millis(ms);
        }
        if let Some(value) = read_env::<bool>("BATTLE_RESULT_CACHING") {
            config.enable_result_caching = value;
        }
        if let Some(value) = read_env::<usize>("BATTLE_HISTORY_LIMIT") {
            config.history_limit = value;
        }
        if let Some(value) = read_env::<u32>("BATTLE_MAX_RETRIES") {
            config.max_retries = value;
        }
        if let Some(seed) = read_env::<u64>("BATTLE_RNG_SEED") {
            config.rng_seed = Some(seed);
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.battle_speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(self.battle_speed));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        Ok(())
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BattleConfig::default();
        assert!(config.enable_animations);
        assert!(config.enable_result_caching);
        assert_eq!(config.animation_timeout, Duration::from_millis(5000));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = BattleConfig {
            battle_speed: 0.0,
            ..BattleConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpeed(0.0)));

        let config = BattleConfig {
            history_limit: 0,
            ..BattleConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroHistoryLimit));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: BattleConfig =
            serde_json::from_str(r#"{ "enable_animations": false, "animation_timeout": 250 }"#)
                .unwrap();
        assert!(!config.enable_animations);
        assert_eq!(config.animation_timeout, Duration::from_millis(250));
        assert_eq!(config.history_limit, 100);
    }
}
