//! Shared constants for test infrastructure

// Versions
pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_1_0: &str = "1.1.0";
pub const VERSION_1_1_0_ALPHA_1: &str = "1.1.0-alpha.1";
pub const VERSION_2_0_0: &str = "2.0.0";

// Tags
pub const TAG_V1_0_0: &str = "v1.0.0";
pub const TAG_V1_1_0: &str = "v1.1.0";
pub const TAG_V1_1_0_ALPHA_1: &str = "v1.1.0-alpha.1";
pub const TAG_V1_1_0_BETA_1: &str = "v1.1.0-beta.1";
pub const TAG_V2_0_0: &str = "v2.0.0";

// Platforms used by the tests regardless of the host
pub const TEST_OS: &str = "linux";
pub const TEST_ARCH: &str = "x86_64";
pub const TEST_ASSET: &str = "tasklog_linux_x86_64";
pub const OTHER_ASSET: &str = "tasklog_windows_x86_64.exe";

pub const DOWNLOAD_BASE: &str = "https://downloads.example.test";

// Binary contents
pub const OLD_BINARY: &[u8] = b"#!/bin/sh\necho old tasklog\n";
pub const NEW_BINARY: &[u8] = b"#!/bin/sh\necho new tasklog\n";

pub const WRONG_CHECKSUM: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Download URL of a test asset
pub fn download_url(asset: &str) -> String {
    format!("{}/{}", DOWNLOAD_BASE, asset)
}
