//! Self-update functionality for tasklog CLI
//!
//! Provides:
//! - Semantic version parsing and ordering with pre-release channels
//! - Release lookup against GitHub releases (stable or per channel)
//! - A throttle marker so passive checks hit the network at most once per interval
//! - Download with optional SHA256 verification
//! - Backup-before-overwrite and atomic binary replacement
//! - Rollback from the retained backup

pub mod archive;
pub mod channel;
pub mod checksum;
pub mod error;
pub mod platform;
pub mod releases;
pub mod throttle;
pub mod transaction;
pub mod updater;
pub mod version;

pub use channel::ReleaseChannel;
pub use error::{ErrorKind, SourceError, UpdateError, VersionError};
pub use platform::PlatformKey;
pub use releases::{GitHubReleases, Release, ReleaseAsset, ReleaseSource};
pub use throttle::CheckThrottle;
pub use transaction::{UpgradeState, UpgradeTransaction};
pub use updater::{UpdateInfo, Updater, UpgradeOutcome};
pub use version::SemanticVersion;

/// GitHub repository owner
pub const REPO_OWNER: &str = "tasklog";

/// GitHub repository name
pub const REPO_NAME: &str = "tasklog";

/// Name of the binary inside release archives (plus the platform's exe suffix)
pub const BINARY_NAME: &str = "tasklog";

/// File name of the throttle marker inside the cache directory
pub const THROTTLE_MARKER: &str = "update_check_timestamp";

/// Suffix appended to the live binary path for the backup copy
pub const BACKUP_SUFFIX: &str = ".backup";
