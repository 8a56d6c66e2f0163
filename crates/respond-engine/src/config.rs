//! Engine configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. A JSON config file (`~/.respond/config.json`, or `RESPOND_CONFIG`)
//! 3. Individual environment overrides
//!
//! # Environment Variables
//!
//! - `RESPOND_CONFIG`: Path of the JSON config file
//! - `RESPOND_DANGER_RADIUS`: Evacuation danger radius
//! - `RESPOND_THROUGHPUT_DIVISOR`: Exit capacity divisor for throughput
//! - `RESPOND_MAX_THROUGHPUT`: Throughput cap (people per second)
//! - `RESPOND_MAX_MATRIX_DIM`: Soft bound on the assignment matrix
//! - `RESPOND_EMERGENCY_PHONE`: Emergency services phone number

use std::path::{Path, PathBuf};
use std::str::FromStr;

use respond_comms::SchedulerConfig;
use respond_evacuation::EvacuationConfig;
use respond_optimizer::OptimizerConfig;
use respond_persistence::read_json_optional;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Environment variable for the config file path.
pub const CONFIG_PATH_ENV: &str = "RESPOND_CONFIG";

pub const DANGER_RADIUS_ENV: &str = "RESPOND_DANGER_RADIUS";
pub const THROUGHPUT_DIVISOR_ENV: &str = "RESPOND_THROUGHPUT_DIVISOR";
pub const MAX_THROUGHPUT_ENV: &str = "RESPOND_MAX_THROUGHPUT";
pub const MAX_MATRIX_DIM_ENV: &str = "RESPOND_MAX_MATRIX_DIM";
pub const EMERGENCY_PHONE_ENV: &str = "RESPOND_EMERGENCY_PHONE";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".respond";

const CONFIG_FILE: &str = "config.json";

/// Get the default config file path.
///
/// 1. `RESPOND_CONFIG` environment variable if set
/// 2. `~/.respond/config.json` if the home directory is available
/// 3. `.respond/config.json` in the current directory as fallback
pub fn default_config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                .join(CONFIG_FILE)
        })
}

/// Configuration for the whole engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub optimizer: OptimizerConfig,
    pub evacuation: EvacuationConfig,
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the optimizer config.
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the evacuation config.
    pub fn with_evacuation(mut self, evacuation: EvacuationConfig) -> Self {
        self.evacuation = evacuation;
        self
    }

    /// Sets the scheduler config.
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Loads the config file (if present) and applies environment overrides.
    ///
    /// With `path = None` the default path is used. A missing file yields
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        let config = match read_json_optional::<EngineConfig>(&path, "config")? {
            Some(config) => {
                debug!(path = %path.display(), "config file loaded");
                config
            }
            None => {
                debug!(path = %path.display(), "no config file, using defaults");
                EngineConfig::default()
            }
        };

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override::<f64, _>(&lookup, DANGER_RADIUS_ENV)? {
            self.evacuation.danger_radius = v;
        }
        if let Some(v) = parse_override::<f64, _>(&lookup, THROUGHPUT_DIVISOR_ENV)? {
            self.evacuation.throughput_divisor = v;
        }
        if let Some(v) = parse_override::<f64, _>(&lookup, MAX_THROUGHPUT_ENV)? {
            self.evacuation.max_throughput = v;
        }
        if let Some(v) = parse_override::<usize, _>(&lookup, MAX_MATRIX_DIM_ENV)? {
            self.optimizer.max_matrix_dim = v;
        }
        if let Some(phone) = lookup(EMERGENCY_PHONE_ENV).filter(|p| !p.trim().is_empty()) {
            self.scheduler.emergency_phone = phone;
        }

        self.validate()?;
        Ok(self)
    }

    /// Rejects settings that would break evacuation math.
    pub fn validate(&self) -> Result<()> {
        let evac = &self.evacuation;
        if !evac.danger_radius.is_finite() || evac.danger_radius < 0.0 {
            return Err(EngineError::Config(format!(
                "danger_radius must be a non-negative number, got {}",
                evac.danger_radius
            )));
        }
        if !evac.throughput_divisor.is_finite() || evac.throughput_divisor <= 0.0 {
            return Err(EngineError::Config(format!(
                "throughput_divisor must be positive, got {}",
                evac.throughput_divisor
            )));
        }
        if evac.max_throughput.is_nan() || evac.max_throughput <= 0.0 {
            return Err(EngineError::Config(format!(
                "max_throughput must be positive, got {}",
                evac.max_throughput
            )));
        }
        Ok(())
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| EngineError::Config(format!("{key}={raw:?}: {e}"))),
    }
}
