//! Hook families and blocking policy
//!
//! A family is a semantic category ("security", "testing", ...) used only to
//! decide what a failure of that hook means for the rest of the pipeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Family assigned to hooks that do not declare one
pub const UNKNOWN_FAMILY: &str = "unknown";

/// What a failing hook of a given family does to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockingBehavior {
    /// A failure stops the pipeline after the current tier
    HardBlock,
    /// A failure is reported as an error but later tiers still run
    SoftBlock,
    /// A failure is reported and logged as a warning
    Warning,
    /// Failures are reported only
    None,
}

impl BlockingBehavior {
    /// Get the string name of this behavior
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BlockingBehavior::HardBlock => "hard-block",
            BlockingBehavior::SoftBlock => "soft-block",
            BlockingBehavior::Warning => "warning",
            BlockingBehavior::None => "none",
        }
    }
}

impl std::fmt::Display for BlockingBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static family → blocking behavior table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyPolicy {
    families: IndexMap<String, BlockingBehavior>,
    fallback: BlockingBehavior,
}

impl Default for FamilyPolicy {
    fn default() -> Self {
        let families = [
            ("security", BlockingBehavior::HardBlock),
            ("file_hygiene", BlockingBehavior::SoftBlock),
            ("testing", BlockingBehavior::SoftBlock),
            ("type_checking", BlockingBehavior::SoftBlock),
            ("linting", BlockingBehavior::Warning),
            ("formatting", BlockingBehavior::Warning),
            ("performance", BlockingBehavior::Warning),
            ("documentation", BlockingBehavior::None),
            (UNKNOWN_FAMILY, BlockingBehavior::Warning),
        ]
        .into_iter()
        .map(|(name, behavior)| (name.to_string(), behavior))
        .collect();

        Self {
            families,
            fallback: BlockingBehavior::Warning,
        }
    }
}

impl FamilyPolicy {
    /// Resolve the blocking behavior of a family, falling back to `warning`
    #[must_use]
    pub fn resolve(&self, family: &str) -> BlockingBehavior {
        self.families.get(family).copied().unwrap_or(self.fallback)
    }

    /// Add or replace a family entry
    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>, behavior: BlockingBehavior) -> Self {
        self.families.insert(family.into(), behavior);
        self
    }

    /// Iterate configured families in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, BlockingBehavior)> {
        self.families.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Behavior applied to families missing from the table
    #[must_use]
    pub fn fallback(&self) -> BlockingBehavior {
        self.fallback
    }
}
