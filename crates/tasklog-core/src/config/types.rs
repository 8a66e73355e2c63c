//! Configuration types consumed by the update subsystem
//!
//! Only the `update:` section is modelled. The other top-level sections of
//! `config.yaml` (jira, tempo, slack, database) belong to other commands and
//! are ignored when deserializing.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// Check interval used when the configured value is missing or unparsable
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Channel strings accepted in `update.channel`
pub const VALID_CHANNELS: &[&str] = &["", "stable", "alpha", "beta", "rc"];

/// Top-level tasklog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasklogConfig {
    /// Update checking configuration
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Update checking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Disable passive update checks (default: checks enabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,

    /// Duration string such as "24h", "1d" or "2h30m"
    #[serde(default = "default_check_interval")]
    pub check_interval: String,

    /// Release channel override; empty means auto-detect from the running version
    #[serde(default)]
    pub channel: String,

    /// Pre-1.0 spelling of the inverted `disabled` flag
    #[serde(default, skip_serializing)]
    check_for_updates: Option<bool>,
}

fn default_check_interval() -> String {
    "24h".to_string()
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            disabled: None,
            check_interval: default_check_interval(),
            channel: String::new(),
            check_for_updates: None,
        }
    }
}

impl UpdateConfig {
    /// Whether passive update checks are turned off
    ///
    /// An explicit `disabled` wins; otherwise the legacy `check_for_updates`
    /// key is honoured with its logic inverted.
    pub fn is_disabled(&self) -> bool {
        self.disabled
            .or(self.check_for_updates.map(|enabled| !enabled))
            .unwrap_or(false)
    }

    /// Parsed check interval, falling back to 24h
    pub fn interval(&self) -> Duration {
        match humantime::parse_duration(self.check_interval.trim()) {
            Ok(interval) => interval,
            Err(e) => {
                debug!(
                    "Invalid check interval {:?} ({}), using default 24h",
                    self.check_interval, e
                );
                DEFAULT_CHECK_INTERVAL
            }
        }
    }

    /// Channel override, `None` when unset
    pub fn channel(&self) -> Option<&str> {
        let channel = self.channel.trim();
        (!channel.is_empty()).then_some(channel)
    }

    /// Warnings for deprecated keys present in the file
    pub fn deprecations(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(enabled) = self.check_for_updates {
            warnings.push(format!(
                "update.check_for_updates is deprecated; replace 'check_for_updates: {}' with 'disabled: {}' (logic is inverted)",
                enabled, !enabled
            ));
        }
        warnings
    }

    /// Validate the section, normalizing the channel to lowercase
    pub fn validate(&mut self) -> Result<()> {
        let channel = self.channel.trim().to_ascii_lowercase();
        if !VALID_CHANNELS.contains(&channel.as_str()) {
            return Err(Error::invalid_config(format!(
                "update.channel must be one of \"\", stable, alpha, beta, rc (got {:?})",
                self.channel
            )));
        }
        self.channel = channel;
        Ok(())
    }
}
