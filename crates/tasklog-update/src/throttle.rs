//! Rate limiting for passive update checks
//!
//! The last check time is the modification time of a marker file in the
//! cache directory. Its contents are irrelevant.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

use crate::THROTTLE_MARKER;

/// Decides whether a remote check is allowed yet
#[derive(Debug, Clone)]
pub struct CheckThrottle {
    marker: PathBuf,
    interval: Duration,
}

impl CheckThrottle {
    /// Throttle using `<cache_dir>/update_check_timestamp`
    pub fn new(cache_dir: impl AsRef<Path>, interval: Duration) -> Self {
        Self {
            marker: cache_dir.as_ref().join(THROTTLE_MARKER),
            interval,
        }
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time of the last recorded check, if any
    pub fn last_check(&self) -> Option<SystemTime> {
        fs::metadata(&self.marker).and_then(|m| m.modified()).ok()
    }

    pub fn should_check(&self) -> bool {
        self.should_check_at(SystemTime::now())
    }

    /// Whether at least one interval has passed since the last check at `now`
    ///
    /// A missing marker allows the check. So does a marker dated in the
    /// future, otherwise a skewed clock could silence checks indefinitely.
    pub fn should_check_at(&self, now: SystemTime) -> bool {
        let Some(last) = self.last_check() else {
            debug!("No update check marker at {:?}", self.marker);
            return true;
        };

        match now.duration_since(last) {
            Ok(elapsed) => {
                debug!(
                    "Last update check {}s ago (interval {}s)",
                    elapsed.as_secs(),
                    self.interval.as_secs()
                );
                elapsed >= self.interval
            }
            Err(_) => true,
        }
    }

    /// Record a check attempt now
    pub fn record_check(&self) -> io::Result<()> {
        self.record_check_at(SystemTime::now())
    }

    /// Record a check attempt at `when`, creating the cache directory if needed
    pub fn record_check_at(&self, when: SystemTime) -> io::Result<()> {
        if let Some(parent) = self.marker.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.marker)?;
        file.set_modified(when)
    }
}
