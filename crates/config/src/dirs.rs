//! Config file discovery
//!
//! Lookup order:
//! 1. An explicitly given path
//! 2. `hookgate.toml` in the current directory
//! 3. `$XDG_CONFIG_HOME/hookgate/config.toml` (defaults to ~/.config)

use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "hookgate.toml";

/// Get the hookgate config directory
///
/// Returns `$XDG_CONFIG_HOME/hookgate` or `~/.config/hookgate`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    BaseDirectories::with_prefix("hookgate").get_config_home()
}

/// Get the user-wide config file path
#[must_use]
pub fn xdg_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Find the config file to load
///
/// An explicit path is returned as is, even if it does not exist, so that
/// loading reports it. Otherwise the first existing candidate wins.
#[must_use]
pub fn find_config_file(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    xdg_config_file().filter(|p| p.is_file())
}
