//! Configuration file support for Circuit.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/circuit/config.toml`.

use crate::params::{
    MAX_DURATION_MINUTES, MAX_REST_SECONDS, MIN_DURATION_MINUTES, MIN_REST_SECONDS,
};
use crate::{Catalog, DifficultyLevel, Error, Exercise, MuscleGroup, Result, WorkoutLocation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub workout: WorkoutConfig,

    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Defaults for `plan` and `start` when flags are omitted
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default)]
    pub muscle_groups: Vec<MuscleGroup>,

    #[serde(default)]
    pub difficulty: DifficultyLevel,

    #[serde(default)]
    pub location: WorkoutLocation,

    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,

    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            muscle_groups: Vec::new(),
            difficulty: DifficultyLevel::default(),
            location: WorkoutLocation::default(),
            duration_minutes: default_duration_minutes(),
            rest_seconds: default_rest_seconds(),
        }
    }
}

/// Timer driver configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

impl TimerConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// User-defined exercises appended to the built-in catalog
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub custom: Vec<Exercise>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("circuit")
}

fn default_duration_minutes() -> u32 {
    crate::params::DEFAULT_DURATION_MINUTES
}

fn default_rest_seconds() -> u32 {
    crate::params::DEFAULT_REST_SECONDS
}

fn default_tick_millis() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("circuit").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check workout defaults against the accepted ranges
    pub fn validate(&self) -> Result<()> {
        let w = &self.workout;
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&w.duration_minutes) {
            return Err(Error::Config(format!(
                "workout.duration_minutes must be {}-{}, got {}",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, w.duration_minutes
            )));
        }
        if !(MIN_REST_SECONDS..=MAX_REST_SECONDS).contains(&w.rest_seconds) {
            return Err(Error::Config(format!(
                "workout.rest_seconds must be {}-{}, got {}",
                MIN_REST_SECONDS, MAX_REST_SECONDS, w.rest_seconds
            )));
        }
        if self.timer.tick_millis == 0 {
            return Err(Error::Config("timer.tick_millis must be positive".into()));
        }
        Ok(())
    }

    /// Built-in catalog merged with `[catalog] custom`, validated
    pub fn catalog(&self) -> Result<Catalog> {
        let catalog = Catalog::with_custom(&self.catalog.custom);
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }
        Ok(catalog)
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data.data_dir.join("sessions.jsonl")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data.data_dir.join("preferences.json")
    }
}
