//! Configuration loader with environment overrides
//!
//! Resolution order (low to high):
//! 1. Built-in defaults
//! 2. Config file (`$TASKLOG_CONFIG`, else `~/.tasklog/config.yaml`)
//! 3. Environment variables (`TASKLOG_UPDATE_*`)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::utils::get_home_dir;
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::debug;

use super::types::TasklogConfig;

/// Environment variable pointing at an alternate config file
pub const CONFIG_PATH_ENV: &str = "TASKLOG_CONFIG";

/// Configuration loader
pub struct ConfigLoader {
    /// Path to config.yaml
    config_path: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the standard config location
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a loader with a custom config file path
    pub fn with_path(config_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Resolve `$TASKLOG_CONFIG` or `~/.tasklog/config.yaml`
    fn default_config_path() -> Result<Utf8PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(Utf8PathBuf::from(path));
            }
        }

        let home = get_home_dir()
            .map_err(|_| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {:?}", p)))?;

        Ok(home.join(".tasklog").join("config.yaml"))
    }

    /// Path to the config file
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Directory holding the config file; also used as the update cache directory
    pub fn config_dir(&self) -> &Utf8Path {
        self.config_path.parent().unwrap_or_else(|| Utf8Path::new("."))
    }

    /// Load the configuration; a missing file is an error
    pub fn load(&self) -> Result<TasklogConfig> {
        if !self.config_path.exists() {
            return Err(Error::config_not_found(self.config_path.as_str()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        let config: TasklogConfig = serde_yaml_ng::from_str(&content)?;

        self.finish(config)
    }

    /// Load the configuration, using defaults when the file doesn't exist
    pub fn load_or_default(&self) -> Result<TasklogConfig> {
        match self.load() {
            Err(Error::ConfigNotFound { path }) => {
                debug!("No config file at {}, using defaults", path);
                self.finish(TasklogConfig::default())
            }
            other => other,
        }
    }

    fn finish(&self, config: TasklogConfig) -> Result<TasklogConfig> {
        let mut config = Self::apply_env_overrides(config)?;
        config.update.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the update section
    fn apply_env_overrides(mut config: TasklogConfig) -> Result<TasklogConfig> {
        if let Ok(val) = env::var("TASKLOG_UPDATE_DISABLED") {
            config.update.disabled = Some(parse_bool(&val).ok_or_else(|| {
                Error::invalid_config("TASKLOG_UPDATE_DISABLED must be true or false")
            })?);
        }

        if let Ok(val) = env::var("TASKLOG_UPDATE_CHECK_INTERVAL") {
            config.update.check_interval = val;
        }

        if let Ok(val) = env::var("TASKLOG_UPDATE_CHANNEL") {
            config.update.channel = val;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
