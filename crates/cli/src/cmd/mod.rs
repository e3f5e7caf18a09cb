//! CLI command implementations
//!
//! This module contains all command implementations for the hookgate CLI.

pub mod list;
pub mod policy;
pub mod run;
