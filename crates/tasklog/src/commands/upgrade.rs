//! Upgrade command

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use dialoguer::Confirm;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::SystemTime;
use tasklog_core::ConfigLoader;
use tasklog_update::{
    GitHubReleases, SemanticVersion, UpdateError, UpdateInfo, Updater, UpgradeOutcome,
};

use super::load_config;
use crate::cli::UpgradeArgs;
use crate::output;
use crate::version::current_version;

pub fn run(args: UpgradeArgs) -> Result<()> {
    let loader = ConfigLoader::new()?;
    let config = load_config(&loader)?;
    let updater = Updater::github(loader.config_dir(), config.update.interval())?;
    let channel = args.channel.as_deref().or(config.update.channel());

    if args.status {
        return show_status(&updater, &loader, config.update.is_disabled(), channel);
    }

    if let Some(backup) = &args.rollback {
        return rollback(&updater, backup, args.yes);
    }

    let current = current_version();
    if is_dev_build(&current) {
        output::warning("Development build; upgrades are only available for release builds");
        return Ok(());
    }

    let spinner = output::spinner("Checking for updates...");
    let update = updater.check_for_update_now(&current, channel);
    spinner.finish_and_clear();

    let Some(info) = update.context("Failed to check for updates")? else {
        output::success(&format!("Already on the latest version ({})", current));
        return Ok(());
    };

    if args.check {
        return report_available(&info);
    }

    do_upgrade(&updater, &info, args.yes)
}

fn is_dev_build(version: &str) -> bool {
    SemanticVersion::parse(version)
        .map(|v| v.is_dev())
        .unwrap_or(true)
}

/// Check for updates only
fn report_available(info: &UpdateInfo) -> Result<()> {
    output::success(&format!("Update available: {}", info.latest_version));
    println!("\n{}", info.summary());
    output::info("Run 'tasklog upgrade' to install the update");
    Ok(())
}

/// Perform the upgrade
fn do_upgrade(updater: &Updater<GitHubReleases>, info: &UpdateInfo, yes: bool) -> Result<()> {
    let mut progress: Option<ProgressBar> = None;

    let result = updater.perform_upgrade(info, |summary| {
        println!("{}", summary);

        let proceed = yes
            || Confirm::new()
                .with_prompt("Proceed with upgrade?")
                .default(false)
                .interact()
                .unwrap_or(false);

        if proceed {
            progress = Some(output::spinner(&format!(
                "Installing tasklog {}...",
                info.latest_version
            )));
        }
        proceed
    });

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match result {
        Ok(UpgradeOutcome::Declined) => {
            output::info("Upgrade cancelled");
            Ok(())
        }
        Ok(UpgradeOutcome::Completed { from, to, backup }) => {
            output::success(&format!("Upgraded tasklog {} -> {}", from, to));
            output::kv("Backup", &backup.display().to_string());
            output::info(&format!(
                "Run 'tasklog upgrade --rollback {}' to restore the previous version",
                backup.display()
            ));
            Ok(())
        }
        Err(e) => Err(report_failure(updater.recover(e))),
    }
}

/// Print what the operator needs to know and hand the error back
fn report_failure(err: UpdateError) -> anyhow::Error {
    if err.must_report() {
        output::error("Upgrade failed after the current binary was backed up");
        if let Some(backup) = err.backup_path() {
            output::kv("Backup", &backup.display().to_string());
        }
        if let UpdateError::ManualRecoveryNeeded { backup, binary, .. } = &err {
            output::warning("Automatic rollback failed. Restore the previous version with:");
            println!("  mv {} {}", backup.display(), binary.display());
        }
    }
    anyhow::Error::new(err).context("Upgrade failed")
}

/// Restore a backup left by a previous upgrade
fn rollback(updater: &Updater<GitHubReleases>, backup: &Path, yes: bool) -> Result<()> {
    if !backup.exists() {
        bail!("Backup not found: {}", backup.display());
    }

    let binary = updater.resolve_binary_path()?;
    if !yes {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Replace {} with {}?",
                binary.display(),
                backup.display()
            ))
            .default(false)
            .interact()?;

        if !proceed {
            output::info("Rollback cancelled");
            return Ok(());
        }
    }

    updater
        .rollback(backup)
        .map_err(|e| anyhow::Error::new(e).context("Rollback failed"))?;
    output::success(&format!("Restored {} from backup", binary.display()));
    Ok(())
}

/// Show update check settings
fn show_status(
    updater: &Updater<GitHubReleases>,
    loader: &ConfigLoader,
    disabled: bool,
    channel: Option<&str>,
) -> Result<()> {
    let throttle = updater.throttle();

    output::header("Update checks");
    output::kv("Config", loader.config_path().as_str());
    output::kv("Version", &current_version());
    output::kv("Enabled", if disabled { "no" } else { "yes" });
    output::kv("Channel", channel.unwrap_or("auto"));
    output::kv("Interval", &format_interval(throttle.interval().as_secs()));
    output::kv("Platform", &updater.platform().to_string());

    match throttle.last_check() {
        Some(last) => {
            output::kv("Last check", &format_time(last));
            let next = last + throttle.interval();
            if next > SystemTime::now() {
                output::kv("Next check", &format_time(next));
            } else {
                output::kv("Next check", "on next run");
            }
        }
        None => output::kv("Last check", "never"),
    }

    if let Ok(binary) = updater.resolve_binary_path() {
        let backup = tasklog_update::transaction::backup_path_for(&binary);
        if backup.exists() {
            output::kv("Backup", &backup.display().to_string());
        }
    }

    Ok(())
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn format_interval(secs: u64) -> String {
    match secs {
        s if s > 0 && s % 86_400 == 0 => format!("{}d", s / 86_400),
        s if s > 0 && s % 3_600 == 0 => format!("{}h", s / 3_600),
        s if s > 0 && s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{}s", s),
    }
}
