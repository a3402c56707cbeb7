//! Simulation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SPEED, STARTING_CREDITS};
use crate::enums::Difficulty;
use crate::error::ConfigError;

/// Engine construction parameters. Every field has a default, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for spawn rolls, events and splits.
    pub seed: u64,
    pub difficulty: Difficulty,
    /// Enables the contamination sub-simulation, hostile events and the wave cap.
    pub extended: bool,
    pub starting_credits: f64,
    /// Initial speed multiplier, in [0, 4].
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            difficulty: Difficulty::Normal,
            extended: false,
            starting_credits: STARTING_CREDITS,
            time_scale: 1.0,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.starting_credits.is_finite() || self.starting_credits < 0.0 {
            return Err(ConfigError::Invalid {
                field: "starting_credits",
                reason: format!("must be a non-negative number, got {}", self.starting_credits),
            });
        }
        if !(0.0..=MAX_SPEED).contains(&self.time_scale) {
            return Err(ConfigError::Invalid {
                field: "time_scale",
                reason: format!("must be within [0, {MAX_SPEED}], got {}", self.time_scale),
            });
        }
        Ok(())
    }
}
