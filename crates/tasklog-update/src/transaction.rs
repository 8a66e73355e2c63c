//! One upgrade attempt, step by step
//!
//! The transaction owns every path an upgrade touches. Steps run in a fixed
//! order and each one either advances the state or returns the error that
//! ends the attempt:
//!
//! `Idle -> Downloading -> Verifying -> BackingUp -> Replacing -> Completed`
//!
//! Staged files live in the binary's own directory and are removed on drop
//! unless they were moved into place.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, info};

use crate::archive;
use crate::checksum;
use crate::error::UpdateError;
use crate::releases::ReleaseSource;
use crate::updater::UpdateInfo;
use crate::{BACKUP_SUFFIX, BINARY_NAME};

/// Moves a staged binary onto the live path
pub type InstallFn = fn(&Path, &Path) -> io::Result<()>;

/// Progress of an upgrade attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    Idle,
    Downloading,
    Verifying,
    BackingUp,
    Replacing,
    Completed,
    Failed,
}

/// Paths and progress of a single upgrade attempt
#[derive(Debug)]
pub struct UpgradeTransaction {
    binary_path: PathBuf,
    backup_path: PathBuf,
    downloaded: Option<TempPath>,
    staged: Option<TempPath>,
    backup_created: bool,
    state: UpgradeState,
}

impl UpgradeTransaction {
    /// Start an attempt against the (already resolved) live binary path
    pub fn begin(binary_path: PathBuf) -> Self {
        let backup_path = backup_path_for(&binary_path);
        Self {
            binary_path,
            backup_path,
            downloaded: None,
            staged: None,
            backup_created: false,
            state: UpgradeState::Idle,
        }
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn backup_created(&self) -> bool {
        self.backup_created
    }

    pub fn state(&self) -> UpgradeState {
        self.state
    }

    fn advance(&mut self, next: UpgradeState) {
        info!("Upgrade {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Mark the attempt as failed
    pub fn fail(&mut self) {
        self.advance(UpgradeState::Failed);
    }

    fn install_dir(&self) -> &Path {
        match self.binary_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Archive entry names to look for: the running file name, then the
    /// name releases ship with
    fn binary_names(&self) -> Vec<String> {
        let shipped = format!("{}{}", BINARY_NAME, env::consts::EXE_SUFFIX);
        let mut names: Vec<String> = self
            .binary_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .into_iter()
            .collect();
        if !names.contains(&shipped) {
            names.push(shipped);
        }
        names
    }

    fn temp_file(&self, prefix: &str) -> io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(prefix)
            .tempfile_in(self.install_dir())
    }

    /// Create and delete a scratch file next to the binary
    pub fn check_write_permission(&self) -> Result<(), UpdateError> {
        debug!("Probing write access to {:?}", self.install_dir());
        self.temp_file(".tasklog_write_test")
            .map(drop)
            .map_err(|source| UpdateError::Permission {
                dir: self.install_dir().to_path_buf(),
                source,
            })
    }

    /// Stream the release asset into a private file beside the binary
    pub fn download<S>(&mut self, source: &S, info: &UpdateInfo) -> Result<(), UpdateError>
    where
        S: ReleaseSource + ?Sized,
    {
        self.advance(UpgradeState::Downloading);
        info!("Downloading {} from {}", info.asset_name, info.download_url);

        let mut file = self
            .temp_file(".tasklog-update-")
            .map_err(UpdateError::Staging)?;
        let bytes = source
            .download(&info.download_url, file.as_file_mut())
            .map_err(UpdateError::Download)?;
        file.as_file_mut().flush().map_err(UpdateError::Staging)?;

        debug!("Downloaded {} bytes to {:?}", bytes, file.path());
        self.downloaded = Some(file.into_temp_path());
        Ok(())
    }

    /// Check the download against its published SHA256, when there is one
    pub fn verify<S>(&mut self, source: &S, info: &UpdateInfo) -> Result<(), UpdateError>
    where
        S: ReleaseSource + ?Sized,
    {
        self.advance(UpgradeState::Verifying);

        let Some(checksum_url) = info.checksum_url.as_deref() else {
            debug!("No checksum published for {}", info.asset_name);
            return Ok(());
        };
        let downloaded = self.downloaded_path()?;

        let mut listing = Vec::new();
        source
            .download(checksum_url, &mut listing)
            .map_err(UpdateError::Download)?;
        let listing = String::from_utf8_lossy(&listing);

        let Some(expected) = checksum::parse_checksum_listing(&listing, &info.asset_name) else {
            let actual = checksum::sha256_file(downloaded).map_err(UpdateError::Staging)?;
            return Err(UpdateError::Integrity {
                asset: info.asset_name.clone(),
                expected: "no entry in checksum file".to_string(),
                actual,
            });
        };

        match checksum::verify_file(downloaded, &expected).map_err(UpdateError::Staging)? {
            Ok(()) => {
                info!("Checksum verified for {}", info.asset_name);
                Ok(())
            }
            Err(actual) => Err(UpdateError::Integrity {
                asset: info.asset_name.clone(),
                expected,
                actual,
            }),
        }
    }

    fn downloaded_path(&self) -> Result<&Path, UpdateError> {
        self.downloaded
            .as_deref()
            .ok_or_else(|| UpdateError::Staging(io::Error::other("no downloaded file to stage")))
    }

    /// Unpack archives and mark the staged binary executable
    pub fn prepare(&mut self, info: &UpdateInfo) -> Result<(), UpdateError> {
        let downloaded = self
            .downloaded
            .take()
            .ok_or_else(|| UpdateError::Staging(io::Error::other("no downloaded file to stage")))?;

        let staged = if archive::is_archive(&info.asset_name) {
            let mut extracted = self
                .temp_file(".tasklog-update-")
                .map_err(UpdateError::Staging)?;
            let names = self.binary_names();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            archive::extract_binary(&downloaded, &names, extracted.as_file_mut())
                .map_err(UpdateError::Staging)?;
            extracted.into_temp_path()
        } else {
            downloaded
        };

        set_executable(&staged).map_err(UpdateError::Staging)?;
        self.staged = Some(staged);
        Ok(())
    }

    /// Copy the live binary to `<binary>.backup`, keeping its permission bits
    pub fn backup(&mut self) -> Result<(), UpdateError> {
        self.advance(UpgradeState::BackingUp);
        info!("Creating backup: {:?}", self.backup_path);

        copy_with_permissions(&self.binary_path, &self.backup_path).map_err(|source| {
            UpdateError::Backup {
                backup: self.backup_path.clone(),
                source,
            }
        })?;

        self.backup_created = true;
        Ok(())
    }

    /// Move the staged binary onto the live path
    pub fn replace(&mut self, install: InstallFn) -> Result<(), UpdateError> {
        self.advance(UpgradeState::Replacing);

        let staged = self.staged.take().ok_or_else(|| UpdateError::Replace {
            backup: self.backup_path.clone(),
            source: io::Error::other("no staged binary"),
        })?;

        if let Err(source) = install(&staged, &self.binary_path) {
            return Err(UpdateError::Replace {
                backup: self.backup_path.clone(),
                source,
            });
        }

        // The staged path no longer exists; don't let TempPath try to remove it
        let _ = staged.keep();
        self.advance(UpgradeState::Completed);
        Ok(())
    }
}

/// `<binary>.backup`
pub fn backup_path_for(binary_path: &Path) -> PathBuf {
    let mut name = binary_path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Atomic rename of the staged file onto the live binary
pub fn install_binary(staged: &Path, target: &Path) -> io::Result<()> {
    // A running executable can't be overwritten on Windows, but it can be renamed
    #[cfg(windows)]
    {
        let aside = target.with_extension("old");
        if aside.exists() {
            fs::remove_file(&aside)?;
        }
        fs::rename(target, &aside)?;
        fs::rename(staged, target).map_err(|e| restore_aside(e, &aside, target))
    }

    #[cfg(not(windows))]
    {
        fs::rename(staged, target)
    }
}

/// Move the set-aside binary back after a failed install
///
/// Returns `failure`, extended with the restore error when the live path could
/// not be restored.
#[cfg_attr(not(windows), allow(dead_code))]
fn restore_aside(failure: io::Error, aside: &Path, target: &Path) -> io::Error {
    match fs::rename(aside, target) {
        Ok(()) => failure,
        Err(restore) => io::Error::new(
            failure.kind(),
            format!(
                "{}; restoring {} to {} also failed: {}",
                failure,
                aside.display(),
                target.display(),
                restore
            ),
        ),
    }
}

fn copy_with_permissions(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let permissions = fs::metadata(from)?.permissions();
    fs::set_permissions(to, permissions)
}

fn set_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
