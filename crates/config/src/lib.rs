//! Configuration management for hookgate
//!
//! This crate handles:
//! - Loading `hookgate.toml` (hooks, run options, tier and family overrides)
//! - Config file discovery (explicit path, working directory, XDG)
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod logging;

// Re-export error types from core
pub use hookgate_core::{Error, Result};

// Re-export main types
pub use config::{Config, OptionsConfig, TierOverride};
pub use dirs::{config_dir, find_config_file, xdg_config_file};
