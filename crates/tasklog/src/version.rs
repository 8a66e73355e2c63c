//! Version information for the tasklog CLI

use serde::{Deserialize, Serialize};

/// Version reported by builds that did not go through the release pipeline
pub const DEV_BUILD: &str = "dev";

/// Version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Semantic version, or "dev"
    pub version: String,

    /// Git commit SHA (short)
    pub commit: Option<String>,

    /// Build date
    pub build_date: Option<String>,

    /// Target triple
    pub target: Option<String>,
}

impl VersionInfo {
    /// Version info baked in at compile time
    ///
    /// Release builds set `TASKLOG_BUILD_VERSION`; anything else is a
    /// development build and never checks for updates.
    pub fn current() -> Self {
        Self {
            version: option_env!("TASKLOG_BUILD_VERSION")
                .unwrap_or(DEV_BUILD)
                .to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            build_date: option_env!("BUILD_DATE").map(String::from),
            target: option_env!("TARGET").map(String::from),
        }
    }

    /// Format as display string
    pub fn display(&self) -> String {
        let mut parts = vec![format!("tasklog {}", self.version)];

        if let Some(commit) = &self.commit {
            parts.push(format!("({})", commit));
        }

        if let Some(target) = &self.target {
            parts.push(target.clone());
        }

        parts.join(" ")
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Version string handed to the updater
pub fn current_version() -> String {
    VersionInfo::current().version
}
