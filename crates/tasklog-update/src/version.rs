//! Semantic version parsing and ordering
//!
//! Wraps [`semver::Version`] with the leniencies release tags need: an
//! optional leading `v`, a missing patch component, and the `dev`
//! sentinel used by local builds. Build metadata is kept for display but
//! ignored by equality and ordering.

use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// Version assigned to development builds (`""` or `"dev"`)
pub const DEV_VERSION: &str = "0.0.0-dev";

/// Parsed semantic version
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    inner: Version,
}

impl SemanticVersion {
    /// Parse a version string such as `v1.2.3`, `1.2.3-beta.1+build5` or `1.2`
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let text = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let text = if text.is_empty() || text == "dev" {
            DEV_VERSION
        } else {
            text
        };

        Version::parse(&fill_missing_patch(text))
            .map(|inner| Self { inner })
            .map_err(|e| VersionError::Invalid {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// Pre-release identifiers, e.g. `beta.1`; empty for stable releases
    pub fn prerelease(&self) -> &str {
        self.inner.pre.as_str()
    }

    /// Build metadata, e.g. `build123`
    pub fn build(&self) -> &str {
        self.inner.build.as_str()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    /// First dot-separated segment of the pre-release (`alpha.3` -> `alpha`)
    pub fn prerelease_channel(&self) -> &str {
        self.prerelease().split('.').next().unwrap_or_default()
    }

    /// Whether this is the `0.0.0-dev` sentinel of a local build
    pub fn is_dev(&self) -> bool {
        self.inner.major == 0
            && self.inner.minor == 0
            && self.inner.patch == 0
            && self.prerelease() == "dev"
    }

    /// Strictly newer by precedence
    pub fn is_newer_than(&self, other: &SemanticVersion) -> bool {
        self > other
    }
}

/// `1.2` -> `1.2.0`, keeping any pre-release or build suffix
fn fill_missing_patch(text: &str) -> String {
    let split = text.find(|c| c == '-' || c == '+').unwrap_or(text.len());
    let (core, suffix) = text.split_at(split);

    if core.split('.').count() == 2 {
        format!("{}.0{}", core, suffix)
    } else {
        text.to_string()
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.inner, &other.inner);
        a.major
            .cmp(&b.major)
            .then(a.minor.cmp(&b.minor))
            .then(a.patch.cmp(&b.patch))
            // semver orders an empty pre-release above any non-empty one
            .then_with(|| a.pre.cmp(&b.pre))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
