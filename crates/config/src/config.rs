//! Configuration management
//!
//! This module handles loading hookgate configuration from TOML.
//!
//! ```toml
//! [options]
//! timeout = 20000
//! fallback_to_sequential = true
//! working_dir = "."
//!
//! [options.env]
//! CI = "1"
//!
//! [tiers.high]
//! timeout = 8000
//! max_concurrency = 4
//!
//! [families]
//! docs = "none"
//!
//! [[hooks]]
//! command = "scripts/check-secrets.sh"
//! priority = "critical"
//! family = "security"
//! ```

use crate::Result;
use hookgate_core::{
    BlockingBehavior, Error, FamilyPolicy, HookSpec, Priority, SchedulerPolicy, TierSpec, TierTable,
};
use hookgate_engine::RunOptions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Run options section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Timeout in milliseconds for hooks that declare none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Run a tier sequentially when its worker pool cannot be created
    #[serde(default = "default_fallback_to_sequential")]
    pub fallback_to_sequential: bool,

    /// Working directory for command hooks, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables for command hooks
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            fallback_to_sequential: default_fallback_to_sequential(),
            working_dir: None,
            env: IndexMap::new(),
        }
    }
}

fn default_fallback_to_sequential() -> bool {
    true
}

/// Override of a single tier; unset fields keep the default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierOverride {
    /// Default timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Maximum number of hooks running at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
}

/// Hookgate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Run options
    #[serde(default)]
    pub options: OptionsConfig,

    /// Tier overrides keyed by tier name
    #[serde(default)]
    pub tiers: IndexMap<String, TierOverride>,

    /// Family blocking behavior overrides
    #[serde(default)]
    pub families: IndexMap<String, BlockingBehavior>,

    /// Declared hooks, in order
    #[serde(default)]
    pub hooks: Vec<HookSpec>,

    /// Directory relative paths are resolved against (not serialized)
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    ///
    /// Relative paths in the file are resolved against its directory.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;

        config.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!(path = %path.display(), hooks = config.hooks.len(), "Loaded config");
        Ok(config)
    }

    /// Load configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails
    pub fn from_toml_str(toml_content: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_content)
            .map_err(|e| Error::Config(format!("Failed to parse config TOML: {e}")))?;
        config.base_dir = Some(base_dir.to_path_buf());
        Ok(config)
    }

    /// Load the discovered config file, or the defaults when there is none
    ///
    /// # Errors
    ///
    /// Returns error if the selected file cannot be read or parsed
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match crate::dirs::find_config_file(explicit, cwd) {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Tier and family tables with overrides applied on top of the defaults
    ///
    /// # Errors
    ///
    /// Returns error for an unknown tier name, a zero concurrency cap, a
    /// zero timeout or a critical cap above one
    pub fn policy(&self) -> Result<SchedulerPolicy> {
        let mut tiers = TierTable::default();
        for (name, tier) in &self.tiers {
            let priority: Priority = name.parse()?;
            let base = tiers.get(priority);
            let timeout = tier.timeout.map_or(base.default_timeout, Duration::from_millis);
            let max_concurrency = tier.max_concurrency.unwrap_or(base.max_concurrency);
            tiers = tiers.with_tier(priority, TierSpec::new(timeout, max_concurrency))?;
        }

        let families = self
            .families
            .iter()
            .fold(FamilyPolicy::default(), |policy, (family, behavior)| {
                policy.with_family(family.clone(), *behavior)
            });

        Ok(SchedulerPolicy::new(tiers, families))
    }

    /// Run options for the engine
    ///
    /// A zero timeout counts as unset.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        let working_dir = self.options.working_dir.as_ref().map(|dir| {
            match &self.base_dir {
                Some(base) if dir.is_relative() => base.join(dir),
                _ => dir.clone(),
            }
        });

        RunOptions {
            verbose: false,
            timeout: self
                .options
                .timeout
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            fallback_to_sequential: self.options.fallback_to_sequential,
            env: self.options.env.clone(),
            working_dir,
        }
    }

    /// Directory relative paths are resolved against
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}
