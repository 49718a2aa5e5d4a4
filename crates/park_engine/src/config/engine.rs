//! Engine configuration

use super::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which storage backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// One file per resource under `base_path`
    #[default]
    File,
    /// In-process table, lost on exit
    Memory,
}

/// Resource storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind
    pub backend: StorageBackendKind,
    /// Directory of the file backend
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::File,
            base_path: PathBuf::from("Storage"),
        }
    }
}

/// Simulation driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Scene random seed
    pub seed: u64,
    /// Seconds per step
    pub delta_time: f32,
    /// Steps to run
    pub steps: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            delta_time: 1.0 / 60.0,
            steps: 600,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `env_logger` default filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Storage settings
    pub storage: StorageConfig,
    /// Simulation settings
    pub simulation: SimulationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            storage: StorageConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Set the log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Use the file backend rooted at `base_path`
    #[must_use]
    pub fn with_file_storage(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.storage.backend = StorageBackendKind::File;
        self.storage.base_path = base_path.into();
        self
    }

    /// Use the in-memory backend
    #[must_use]
    pub const fn with_memory_storage(mut self) -> Self {
        self.storage.backend = StorageBackendKind::Memory;
        self
    }

    /// Set the scene seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.simulation.seed = seed;
        self
    }

    /// Set the step length and count
    #[must_use]
    pub const fn with_steps(mut self, delta_time: f32, steps: u32) -> Self {
        self.simulation.delta_time = delta_time;
        self.simulation.steps = steps;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)));
        }
        if !(self.simulation.delta_time.is_finite() && self.simulation.delta_time > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "delta_time must be positive, got {}",
                self.simulation.delta_time
            )));
        }
        if self.storage.backend == StorageBackendKind::File && self.storage.base_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage base_path is empty".to_string()));
        }
        Ok(())
    }
}
