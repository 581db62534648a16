use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Geometry
    pub rows: usize,
    pub cols: usize,

    // Population caps
    pub max_vegetation: usize,
    pub max_herbivores: usize,
    pub max_predators: usize,
    pub max_group: usize,

    // Individuals
    pub max_energy: i32,
    pub max_life: u32,
    pub aging: i32,
    pub aging_interval: u32,
    pub min_move_energy: i32,
    pub stay_bonus: f32,
    pub social_threshold: f32,

    // Vegetation
    pub growing: f32,
    pub max_density: f32,
    pub initial_density: f32,

    // Appeal weights
    pub herbivore_prey_penalty: f32,
    pub herbivore_predator_bonus: f32,
    pub predator_prey_penalty: f32,
    pub predator_predator_penalty: f32,

    // RNG
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 50,
            cols: 50,

            max_vegetation: 400,
            max_herbivores: 400,
            max_predators: 400,
            max_group: 100,

            max_energy: 100,
            max_life: 140,
            aging: 1,
            aging_interval: 10, // one energy point lost every ten days
            min_move_energy: 4,
            stay_bonus: 50.0,
            social_threshold: 0.5,

            growing: 0.5,
            max_density: 100.0,
            initial_density: 5.0,

            herbivore_prey_penalty: 10.0,
            herbivore_predator_bonus: 50.0,
            predator_prey_penalty: 25.0,
            predator_predator_penalty: 10.0,

            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < 3 || self.cols < 3 {
            return Err(ConfigError::Invalid("grid must be at least 3x3"));
        }
        if self.max_energy <= 0 || self.max_life == 0 {
            return Err(ConfigError::Invalid("energy and lifetime caps must be positive"));
        }
        if self.max_group == 0 {
            return Err(ConfigError::Invalid("max_group must be positive"));
        }
        if self.aging_interval == 0 {
            return Err(ConfigError::Invalid("aging_interval must be positive"));
        }
        if self.max_density <= 0.0 || self.initial_density < 0.0 || self.initial_density > self.max_density {
            return Err(ConfigError::Invalid("vegetation density bounds are inconsistent"));
        }
        if !(0.0..=1.0).contains(&self.social_threshold) {
            return Err(ConfigError::Invalid("social_threshold must lie in [0, 1]"));
        }
        Ok(())
    }
}
