//! Configuration loading and management

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{TasklogConfig, UpdateConfig, DEFAULT_CHECK_INTERVAL, VALID_CHANNELS};
