//! Passive "new version available" notice
//!
//! Runs a throttled check before regular commands. Nothing here may fail
//! the command that triggered it.

use anyhow::Result;
use std::env;
use tasklog_core::ConfigLoader;
use tasklog_update::Updater;
use tracing::debug;

use super::load_config;
use crate::output;
use crate::version::current_version;

/// Set to any value to skip the passive check
pub const NO_UPDATE_CHECK_ENV: &str = "TASKLOG_NO_UPDATE_CHECK";

pub fn run(quiet: bool) {
    if quiet || env::var_os(NO_UPDATE_CHECK_ENV).is_some() {
        return;
    }

    if let Err(e) = check() {
        debug!("Passive update check failed: {:#}", e);
    }
}

fn check() -> Result<()> {
    let loader = ConfigLoader::new()?;
    let config = load_config(&loader)?;
    if config.update.is_disabled() {
        debug!("Update checks disabled in configuration");
        return Ok(());
    }

    let updater = Updater::github(loader.config_dir(), config.update.interval())?;
    if let Some(info) = updater.check_for_update(&current_version(), config.update.channel())? {
        output::notice(&format!(
            "A new version of tasklog is available: {} -> {}",
            info.current_version, info.latest_version
        ));
        output::notice("Run 'tasklog upgrade' to install it");
    }

    Ok(())
}
