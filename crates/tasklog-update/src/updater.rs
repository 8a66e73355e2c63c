//! Update checks and the upgrade orchestrator

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::channel::ReleaseChannel;
use crate::error::{ErrorKind, UpdateError};
use crate::platform::{find_checksum_asset, PlatformKey};
use crate::releases::{GitHubReleases, ReleaseSource};
use crate::throttle::CheckThrottle;
use crate::transaction::{install_binary, InstallFn, UpgradeTransaction};
use crate::version::SemanticVersion;
use crate::{REPO_NAME, REPO_OWNER};

/// A newer release that can be installed on this platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub current_version: String,
    pub latest_version: String,
    pub release_url: String,
    pub release_notes: String,
    pub download_url: String,
    pub asset_name: String,
    pub checksum_url: Option<String>,
    pub is_prerelease: bool,
}

impl UpdateInfo {
    /// Human-readable description shown before asking for confirmation
    pub fn summary(&self) -> String {
        let kind = if self.is_prerelease {
            "Pre-release"
        } else {
            "Stable"
        };
        let mut summary = format!(
            "New version available!\n  Current version: {}\n  Latest version:  {}\n  Type:            {}\n  Release URL:     {}\n",
            self.current_version, self.latest_version, kind, self.release_url
        );
        if !self.release_notes.trim().is_empty() {
            summary.push_str("\nRelease notes:\n");
            summary.push_str(self.release_notes.trim());
            summary.push('\n');
        }
        summary
    }
}

/// Result of a completed (or declined) upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The confirmation callback said no; nothing was touched
    Declined,
    Completed {
        from: String,
        to: String,
        backup: PathBuf,
    },
}

/// Checks for newer releases and installs them over the running binary
pub struct Updater<S: ReleaseSource> {
    source: S,
    throttle: CheckThrottle,
    platform: PlatformKey,
    binary_path: Option<PathBuf>,
    install: InstallFn,
}

impl Updater<GitHubReleases> {
    /// Updater backed by the project's GitHub releases
    pub fn github(cache_dir: impl AsRef<Path>, interval: Duration) -> Result<Self, UpdateError> {
        let source = GitHubReleases::new(REPO_OWNER, REPO_NAME)?;
        Ok(Self::new(source, CheckThrottle::new(cache_dir, interval)))
    }
}

impl<S: ReleaseSource> Updater<S> {
    pub fn new(source: S, throttle: CheckThrottle) -> Self {
        Self {
            source,
            throttle,
            platform: PlatformKey::current(),
            binary_path: None,
            install: install_binary,
        }
    }

    /// Look for assets of a different platform
    pub fn with_platform(mut self, platform: PlatformKey) -> Self {
        self.platform = platform;
        self
    }

    /// Upgrade this file instead of the running executable
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    /// Replace how the staged binary is moved onto the live path
    pub fn with_installer(mut self, install: InstallFn) -> Self {
        self.install = install;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn throttle(&self) -> &CheckThrottle {
        &self.throttle
    }

    pub fn platform(&self) -> &PlatformKey {
        &self.platform
    }

    /// Passive check, rate limited by the throttle marker
    ///
    /// `Ok(None)` covers every "nothing to do" case: throttled, development
    /// build, unparsable current version, or already up to date.
    pub fn check_for_update(
        &self,
        current_version: &str,
        channel: Option<&str>,
    ) -> Result<Option<UpdateInfo>, UpdateError> {
        if !self.throttle.should_check() {
            debug!("Skipping update check (checked within the last interval)");
            return Ok(None);
        }
        self.check(current_version, channel, true)
    }

    /// Explicit check that ignores and does not touch the throttle marker
    pub fn check_for_update_now(
        &self,
        current_version: &str,
        channel: Option<&str>,
    ) -> Result<Option<UpdateInfo>, UpdateError> {
        self.check(current_version, channel, false)
    }

    fn check(
        &self,
        current_version: &str,
        channel: Option<&str>,
        record: bool,
    ) -> Result<Option<UpdateInfo>, UpdateError> {
        let current = match SemanticVersion::parse(current_version) {
            Ok(v) if v.is_dev() => {
                debug!("Development build, skipping update check");
                return Ok(None);
            }
            Ok(v) => v,
            Err(e) => {
                debug!("Cannot check for updates: {}", e);
                return Ok(None);
            }
        };

        if record {
            if let Err(e) = self.throttle.record_check() {
                debug!("Failed to record update check: {}", e);
            }
        }

        let channel = ReleaseChannel::resolve(channel, &current);
        info!("Checking for updates on the {} channel", channel);

        let release = if channel.is_stable() {
            self.source.latest_stable()?
        } else {
            self.source.latest_for_channel(channel)?
        };

        let latest = SemanticVersion::parse(&release.tag_name)?;
        if !latest.is_newer_than(&current) {
            info!("Already on the latest version ({})", current);
            return Ok(None);
        }

        let asset = self
            .platform
            .find_asset(&release)
            .ok_or_else(|| UpdateError::NoPlatformAsset {
                platform: self.platform.to_string(),
            })?;
        let checksum_url =
            find_checksum_asset(&release, asset).map(|a| a.browser_download_url.clone());

        debug!("Found asset {} for {}", asset.name, self.platform);

        Ok(Some(UpdateInfo {
            current_version: current.to_string(),
            latest_version: latest.to_string(),
            release_url: self.source.release_web_url(&release.tag_name),
            release_notes: release.body.clone().unwrap_or_default(),
            download_url: asset.browser_download_url.clone(),
            asset_name: asset.name.clone(),
            checksum_url,
            is_prerelease: release.prerelease || latest.is_prerelease(),
        }))
    }

    /// Install `info` over the live binary
    ///
    /// `confirm` receives [`UpdateInfo::summary`] and is asked exactly once,
    /// before anything is downloaded. On success the backup is left in
    /// place; on a failed replace the caller can hand the error to
    /// [`Updater::recover`].
    pub fn perform_upgrade<F>(
        &self,
        info: &UpdateInfo,
        confirm: F,
    ) -> Result<UpgradeOutcome, UpdateError>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(&info.summary()) {
            info!("Upgrade declined");
            return Ok(UpgradeOutcome::Declined);
        }

        let binary_path = self.resolve_binary_path()?;
        let mut tx = UpgradeTransaction::begin(binary_path);

        match self.run(&mut tx, info) {
            Ok(()) => {
                info!(
                    "Upgraded {} -> {} (backup at {:?})",
                    info.current_version,
                    info.latest_version,
                    tx.backup_path()
                );
                Ok(UpgradeOutcome::Completed {
                    from: info.current_version.clone(),
                    to: info.latest_version.clone(),
                    backup: tx.backup_path().to_path_buf(),
                })
            }
            Err(e) => {
                tx.fail();
                error!("Upgrade failed: {}", e);
                Err(e)
            }
        }
    }

    fn run(&self, tx: &mut UpgradeTransaction, info: &UpdateInfo) -> Result<(), UpdateError> {
        tx.check_write_permission()?;
        tx.download(&self.source, info)?;
        tx.verify(&self.source, info)?;
        tx.prepare(info)?;
        tx.backup()?;
        tx.replace(self.install)
    }

    /// Canonical path of the binary being upgraded
    pub fn resolve_binary_path(&self) -> Result<PathBuf, UpdateError> {
        let path = match &self.binary_path {
            Some(path) => path.clone(),
            None => current_exe()?,
        };
        fs::canonicalize(&path).map_err(UpdateError::BinaryPath)
    }

    /// Move `backup` back onto the live binary path
    ///
    /// The backup is consumed.
    pub fn rollback(&self, backup: &Path) -> Result<(), UpdateError> {
        let binary = self.resolve_binary_path()?;
        warn!("Rolling back {:?} from {:?}", binary, backup);

        fs::rename(backup, &binary).map_err(|source| UpdateError::Rollback {
            backup: backup.to_path_buf(),
            binary: binary.clone(),
            source,
        })?;

        info!("Rollback completed");
        Ok(())
    }

    /// Try to roll back after a failed replace
    ///
    /// Other failures happen before the live binary is touched and are
    /// returned unchanged.
    pub fn recover(&self, failure: UpdateError) -> UpdateError {
        if failure.kind() != ErrorKind::Replace {
            return failure;
        }
        let Some(backup) = failure.backup_path().map(Path::to_path_buf) else {
            return failure;
        };

        match self.rollback(&backup) {
            Ok(()) => UpdateError::RolledBack {
                failure: Box::new(failure),
                backup,
            },
            Err(rollback) => {
                let binary = match &rollback {
                    UpdateError::Rollback { binary, .. } => binary.clone(),
                    _ => self
                        .binary_path
                        .clone()
                        .or_else(|| env::current_exe().ok())
                        .unwrap_or_default(),
                };
                UpdateError::ManualRecoveryNeeded {
                    failure: Box::new(failure),
                    rollback: Box::new(rollback),
                    backup,
                    binary,
                }
            }
        }
    }
}

fn current_exe() -> Result<PathBuf, UpdateError> {
    let exe = env::current_exe().map_err(UpdateError::BinaryPath)?;

    // Linux reports a replaced executable as "<path> (deleted)"
    match exe.to_str().and_then(|s| s.strip_suffix(" (deleted)")) {
        Some(stripped) => Ok(PathBuf::from(stripped)),
        None => Ok(exe),
    }
}
