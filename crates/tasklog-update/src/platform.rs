//! Platform detection and asset selection
//!
//! Release assets are named `tasklog_<os>_<arch>` (optionally with an archive
//! extension). The key uses the release pipeline's vocabulary, so Rust's
//! `macos`/`aarch64`/`x86` become `darwin`/`arm64`/`i386`.

use std::fmt;
use tracing::debug;

use crate::releases::{Release, ReleaseAsset};

/// Extensions of checksum files published next to binaries
const CHECKSUM_SUFFIXES: &[&str] = &[".sha256", ".sha256sum"];

/// Combined checksum listing published by goreleaser
const CHECKSUM_LISTING: &str = "checksums.txt";

/// `<os>_<arch>` key searched for in asset names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformKey {
    os: String,
    arch: String,
}

impl PlatformKey {
    /// Key for the running process
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a key from raw OS and architecture names
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: normalize_os(os).to_string(),
            arch: normalize_arch(arch).to_string(),
        }
    }

    /// First binary asset whose name contains this key
    pub fn find_asset<'a>(&self, release: &'a Release) -> Option<&'a ReleaseAsset> {
        let key = self.to_string();
        debug!("Looking for asset matching {}", key);

        release
            .assets
            .iter()
            .find(|a| a.name.contains(&key) && !is_checksum_asset(&a.name))
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

fn normalize_os(os: &str) -> &str {
    match os {
        "macos" | "darwin" => "darwin",
        other => other,
    }
}

fn normalize_arch(arch: &str) -> &str {
    match arch {
        "amd64" | "x86_64" => "x86_64",
        "x86" | "386" | "i686" => "i386",
        "aarch64" | "arm64" => "arm64",
        other => other,
    }
}

/// Whether an asset is a checksum file rather than a binary
pub fn is_checksum_asset(name: &str) -> bool {
    name == CHECKSUM_LISTING || CHECKSUM_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Checksum reference for `asset`: its own `.sha256` file, else `checksums.txt`
pub fn find_checksum_asset<'a>(
    release: &'a Release,
    asset: &ReleaseAsset,
) -> Option<&'a ReleaseAsset> {
    let dedicated = CHECKSUM_SUFFIXES
        .iter()
        .map(|suffix| format!("{}{}", asset.name, suffix))
        .find_map(|name| release.assets.iter().find(|a| a.name == name));

    dedicated.or_else(|| release.assets.iter().find(|a| a.name == CHECKSUM_LISTING))
}
