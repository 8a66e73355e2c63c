//! Error taxonomy for the update subsystem
//!
//! Failures before the backup step leave no trace on disk and callers may
//! treat them as "could not update". From the backup step onward every
//! error carries the paths needed to recover and must be shown to the user.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version string could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version format: {input} ({reason})")]
    Invalid { input: String, reason: String },
}

/// Release-hosting service failure
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("no release found for channel: {channel}")]
    NoMatchingRelease { channel: String },

    #[error("failed to stream response body: {0}")]
    Stream(#[from] io::Error),
}

impl SourceError {
    /// HTTP status code for non-2xx responses
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            SourceError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Stable discriminant for [`UpdateError`], for callers that branch on the
/// failure class instead of matching message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Version,
    Source,
    NoPlatformAsset,
    BinaryPath,
    Permission,
    Download,
    Integrity,
    Staging,
    Backup,
    Replace,
    Rollback,
    RolledBack,
    ManualRecoveryNeeded,
}

/// Update check or upgrade failure
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("failed to fetch latest release: {0}")]
    Source(#[from] SourceError),

    #[error("no binary found for platform {platform}")]
    NoPlatformAsset { platform: String },

    #[error("failed to resolve current binary path: {0}")]
    BinaryPath(#[source] io::Error),

    #[error(
        "insufficient permissions to update binary in {}: {source}\nTry running with sudo or install to a user-writable location",
        .dir.display()
    )]
    Permission { dir: PathBuf, source: io::Error },

    #[error("failed to download binary: {0}")]
    Download(#[source] SourceError),

    #[error("checksum verification failed for {asset}: expected {expected}, got {actual}")]
    Integrity {
        asset: String,
        expected: String,
        actual: String,
    },

    #[error("failed to stage new binary: {0}")]
    Staging(#[source] io::Error),

    #[error("failed to create backup at {}: {source}", .backup.display())]
    Backup { backup: PathBuf, source: io::Error },

    #[error("failed to replace binary (backup kept at {}): {source}", .backup.display())]
    Replace { backup: PathBuf, source: io::Error },

    #[error("rollback failed restoring {} to {}: {source}", .backup.display(), .binary.display())]
    Rollback {
        backup: PathBuf,
        binary: PathBuf,
        source: io::Error,
    },

    #[error("{failure}\nPrevious version restored from {}", .backup.display())]
    RolledBack {
        failure: Box<UpdateError>,
        backup: PathBuf,
    },

    #[error(
        "{failure}\nRollback also failed: {rollback}\nRestore manually: mv {} {}",
        .backup.display(),
        .binary.display()
    )]
    ManualRecoveryNeeded {
        failure: Box<UpdateError>,
        rollback: Box<UpdateError>,
        backup: PathBuf,
        binary: PathBuf,
    },
}

impl UpdateError {
    /// Failure class
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::Version(_) => ErrorKind::Version,
            UpdateError::Source(_) => ErrorKind::Source,
            UpdateError::NoPlatformAsset { .. } => ErrorKind::NoPlatformAsset,
            UpdateError::BinaryPath(_) => ErrorKind::BinaryPath,
            UpdateError::Permission { .. } => ErrorKind::Permission,
            UpdateError::Download(_) => ErrorKind::Download,
            UpdateError::Integrity { .. } => ErrorKind::Integrity,
            UpdateError::Staging(_) => ErrorKind::Staging,
            UpdateError::Backup { .. } => ErrorKind::Backup,
            UpdateError::Replace { .. } => ErrorKind::Replace,
            UpdateError::Rollback { .. } => ErrorKind::Rollback,
            UpdateError::RolledBack { .. } => ErrorKind::RolledBack,
            UpdateError::ManualRecoveryNeeded { .. } => ErrorKind::ManualRecoveryNeeded,
        }
    }

    /// Backup that can restore the previous binary, if one was written
    pub fn backup_path(&self) -> Option<&Path> {
        match self {
            UpdateError::Replace { backup, .. }
            | UpdateError::Rollback { backup, .. }
            | UpdateError::RolledBack { backup, .. }
            | UpdateError::ManualRecoveryNeeded { backup, .. } => Some(backup),
            _ => None,
        }
    }

    /// Whether the failure happened at or after the backup step and has to be
    /// reported verbatim rather than folded into "no update"
    pub fn must_report(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Backup
                | ErrorKind::Replace
                | ErrorKind::Rollback
                | ErrorKind::RolledBack
                | ErrorKind::ManualRecoveryNeeded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path_only_after_backup_exists() {
        let err = UpdateError::Backup {
            backup: PathBuf::from("/usr/local/bin/tasklog.backup"),
            source: io::Error::other("disk full"),
        };
        assert!(err.backup_path().is_none());
        assert!(err.must_report());

        let err = UpdateError::Replace {
            backup: PathBuf::from("/usr/local/bin/tasklog.backup"),
            source: io::Error::other("busy"),
        };
        assert_eq!(
            err.backup_path(),
            Some(Path::new("/usr/local/bin/tasklog.backup"))
        );
        assert_eq!(err.kind(), ErrorKind::Replace);
    }

    #[test]
    fn test_manual_recovery_reports_both_failures() {
        let failure = UpdateError::Replace {
            backup: PathBuf::from("/opt/tasklog.backup"),
            source: io::Error::other("rename denied"),
        };
        let rollback = UpdateError::Rollback {
            backup: PathBuf::from("/opt/tasklog.backup"),
            binary: PathBuf::from("/opt/tasklog"),
            source: io::Error::other("still denied"),
        };
        let err = UpdateError::ManualRecoveryNeeded {
            failure: Box::new(failure),
            rollback: Box::new(rollback),
            backup: PathBuf::from("/opt/tasklog.backup"),
            binary: PathBuf::from("/opt/tasklog"),
        };

        let msg = err.to_string();
        assert!(msg.contains("rename denied"));
        assert!(msg.contains("still denied"));
        assert!(msg.contains("mv /opt/tasklog.backup /opt/tasklog"));
    }

    #[test]
    fn test_check_failures_are_quiet() {
        let err = UpdateError::NoPlatformAsset {
            platform: "linux_x86_64".to_string(),
        };
        assert!(!err.must_report());

        let err = UpdateError::Source(SourceError::Status {
            status: 403,
            body: "rate limited".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Source);
        assert!(err.to_string().contains("403"));
    }
}
