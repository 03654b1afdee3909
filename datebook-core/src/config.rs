//! Engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::constants::{
    DEFAULT_HORIZON_YEARS, DEFAULT_MAX_INSTANCES, DEFAULT_NOTIFICATION_MINUTES,
    DEFAULT_TICK_INTERVAL_SECS,
};
use crate::error::{EngineError, EngineResult};
use crate::recurrence::ExpandOptions;

fn default_horizon_years() -> u32 {
    DEFAULT_HORIZON_YEARS
}

fn default_max_instances() -> usize {
    DEFAULT_MAX_INSTANCES
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS)
}

fn default_notification_minutes() -> u32 {
    DEFAULT_NOTIFICATION_MINUTES
}

/// Configuration at ~/.config/datebook/config.toml
///
/// Every key is optional; a missing file means all defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Years past the anchor that open-ended rules are expanded to.
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    #[serde(default = "default_max_instances")]
    pub max_instances: usize,

    /// Reminder loop period, in humantime format ("1s", "500ms").
    #[serde(
        default = "default_tick_interval",
        deserialize_with = "deserialize_humantime"
    )]
    pub tick_interval: Duration,

    /// Lead time given to new events that do not specify one.
    #[serde(default = "default_notification_minutes")]
    pub default_notification_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            horizon_years: DEFAULT_HORIZON_YEARS,
            max_instances: DEFAULT_MAX_INSTANCES,
            tick_interval: default_tick_interval(),
            default_notification_minutes: DEFAULT_NOTIFICATION_MINUTES,
        }
    }
}

impl EngineConfig {
    pub fn config_dir() -> EngineResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EngineError::Config("Could not determine config directory".into()))?
            .join("datebook");

        Ok(config_dir)
    }

    pub fn config_path() -> EngineResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load ~/.config/datebook/config.toml, falling back to defaults.
    pub fn load() -> EngineResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EngineResult<()> {
        if self.max_instances == 0 {
            return Err(EngineError::Config("max_instances must be at least 1".into()));
        }
        if self.tick_interval.is_zero() {
            return Err(EngineError::Config("tick_interval must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn expand_options(&self) -> ExpandOptions {
        ExpandOptions {
            horizon_years: self.horizon_years,
            max_instances: self.max_instances,
        }
    }
}

fn deserialize_humantime<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}
