//! Configuration module
//!
//! Provider endpoints, gate constraints and logging settings, loaded from a
//! TOML file layered under environment overrides.

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::*;
