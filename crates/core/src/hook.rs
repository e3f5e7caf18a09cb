//! Hook descriptors
//!
//! [`HookSpec`] is the plain data exchanged at the boundary; every field but
//! `command` is optional. [`ClassifiedHook`] is the same hook after priority,
//! family, timeout and blocking behavior have been resolved.

use crate::family::BlockingBehavior;
use crate::tier::TierLabel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A hook as declared by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSpec {
    /// Invocation string; a hook without one is a configuration error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Human readable label, preferred over the command in reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tier name (defaults to `medium`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// Semantic category used for blocking policy (defaults to `unknown`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Timeout in milliseconds (defaults from the tier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl HookSpec {
    /// Create a hook running `command` with every other field defaulted
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// Set the priority tier name
    #[must_use]
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Set the family
    #[must_use]
    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Set the timeout in milliseconds
    #[must_use]
    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Label used to identify this hook in results
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.command.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// A hook with every scheduling field resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedHook {
    /// Identifying label (description, command, or a positional placeholder)
    pub label: String,

    /// Invocation string, if any
    pub command: Option<String>,

    /// Resolved tier (unknown names kept verbatim)
    pub priority: TierLabel,

    /// Resolved family
    pub family: String,

    /// Effective deadline
    #[serde(with = "crate::millis")]
    pub timeout: Duration,

    /// Blocking behavior looked up from the family
    pub blocking_behavior: BlockingBehavior,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_hook_spec_builder() {
        let hook = HookSpec::new("cargo test")
            .priority("high")
            .family("testing")
            .timeout_ms(500);
        assert_eq!(hook.command.as_deref(), Some("cargo test"));
        assert_eq!(hook.priority.as_deref(), Some("high"));
        assert_eq!(hook.family.as_deref(), Some("testing"));
        assert_eq!(hook.timeout, Some(500));
    }

    #[test]
    fn test_label_prefers_description() {
        let hook = HookSpec::new("scripts/lint.sh").description("lint staged files");
        assert_eq!(hook.label(), Some("lint staged files"));
        assert_eq!(HookSpec::new("scripts/lint.sh").label(), Some("scripts/lint.sh"));
        assert_eq!(HookSpec::default().label(), None);
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let hook: HookSpec =
            serde_json::from_value(serde_json::json!({"command": "true"})).unwrap();
        assert_eq!(hook, HookSpec::new("true"));
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let hook: HookSpec = serde_json::from_value(serde_json::json!({
            "command": "true",
            "priority": "low",
            "matcher": "Edit|Write"
        }))
        .unwrap();
        assert_eq!(hook.priority.as_deref(), Some("low"));
    }

    #[test]
    fn test_deserialize_toml() {
        let toml = r#"
command = "scripts/check-secrets.sh"
priority = "critical"
family = "security"
timeout = 2000
"#;
        let hook: HookSpec = toml::from_str(toml).unwrap();
        assert_eq!(hook.priority.as_deref(), Some("critical"));
        assert_eq!(hook.timeout, Some(2000));
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let json = serde_json::to_value(HookSpec::new("true")).unwrap();
        assert_eq!(json, serde_json::json!({"command": "true"}));
    }
}
