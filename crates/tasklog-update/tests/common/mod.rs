//! Common test infrastructure for tasklog-update tests
//!
//! # Modules
//!
//! - `constants`: Version strings, platform keys, test content
//! - `builders`: Fluent builders for Release and ReleaseAsset
//! - `fake_source`: In-memory ReleaseSource that counts calls
//! - `mock_server`: Wiremock setup helpers for the GitHub API

// Not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fake_source;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use fake_source::*;
pub use mock_server::*;
