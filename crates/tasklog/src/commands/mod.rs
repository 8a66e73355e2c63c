//! CLI command implementations

pub mod notice;
pub mod upgrade;
pub mod version;

use anyhow::{Context, Result};
use tasklog_core::{ConfigLoader, TasklogConfig};

use crate::output;

/// Load `config.yaml` (or defaults) and surface deprecated keys
pub(crate) fn load_config(loader: &ConfigLoader) -> Result<TasklogConfig> {
    let config = loader
        .load_or_default()
        .with_context(|| format!("Failed to load {}", loader.config_path()))?;

    for warning in config.update.deprecations() {
        output::warning(&warning);
    }

    Ok(config)
}
