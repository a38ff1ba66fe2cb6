/// Game configuration constants and their runtime overrides.
///
/// This module defines the main gameplay parameters such as round count,
/// round timer duration and the scoring curve. The constants are the defaults;
/// `GameConfig::from_env` lets a deployment substitute them without a rebuild.
use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::game::types::Location;

/// Number of rounds in a match.
pub const MAX_ROUNDS: u32 = 5;

/// Duration (in seconds) a round stays open after the first guess.
pub const ROUND_DURATION_SECS: u64 = 30;

/// Score awarded for a perfect guess.
pub const BASE_SCORE: u32 = 5000;

/// Points lost per kilometre of error. With 10.0 a guess scores zero beyond 500 km.
pub const DISTANCE_PENALTY: f64 = 10.0;

/// Location used when a mode has no catalog entries.
pub fn fallback_location() -> Location {
    Location::new(53.9, 27.57, "Minsk")
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be {expected}")]
    OutOfRange {
        key: &'static str,
        expected: &'static str,
    },
}

/// Runtime game rules shared by every session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub max_rounds: u32,
    pub round_duration: Duration,
    pub base_score: u32,
    pub distance_penalty: f64,
    pub fallback_location: Location,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: MAX_ROUNDS,
            round_duration: Duration::from_secs(ROUND_DURATION_SECS),
            base_score: BASE_SCORE,
            distance_penalty: DISTANCE_PENALTY,
            fallback_location: fallback_location(),
        }
    }
}

impl GameConfig {
    /// Build the config from `GEODUEL_*` environment variables, keeping defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(rounds) = parse_var::<u32, _>(&lookup, "GEODUEL_MAX_ROUNDS")? {
            config.max_rounds = rounds;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "GEODUEL_ROUND_SECS")? {
            config.round_duration = Duration::from_secs(secs);
        }
        if let Some(base) = parse_var::<u32, _>(&lookup, "GEODUEL_BASE_SCORE")? {
            config.base_score = base;
        }
        if let Some(penalty) = parse_var::<f64, _>(&lookup, "GEODUEL_DISTANCE_PENALTY")? {
            config.distance_penalty = penalty;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            return Err(ConfigError::OutOfRange {
                key: "GEODUEL_MAX_ROUNDS",
                expected: "at least 1",
            });
        }
        if self.round_duration.is_zero() {
            return Err(ConfigError::OutOfRange {
                key: "GEODUEL_ROUND_SECS",
                expected: "at least 1",
            });
        }
        if !self.distance_penalty.is_finite() || self.distance_penalty < 0.0 {
            return Err(ConfigError::OutOfRange {
                key: "GEODUEL_DISTANCE_PENALTY",
                expected: "a finite, non-negative number",
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
