//! # tasklog-core
//!
//! Core library for the tasklog CLI providing:
//! - Configuration file loading (`~/.tasklog/config.yaml`)
//! - Environment variable overrides for the update settings
//! - Shared error type

pub mod config;
pub mod error;
pub mod utils;

pub use config::{ConfigLoader, TasklogConfig, UpdateConfig};
pub use error::{Error, Result};
pub use utils::get_home_dir;
