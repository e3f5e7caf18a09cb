//! Priority tiers
//!
//! Tiers are a fixed set of five execution buckets. Their order defines the
//! global execution order of a pipeline run; each one carries a default
//! timeout, a parallelism cap and an execution strategy.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One of the five priority tiers, ordered from first to last executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Highest-stakes checks, executed one at a time
    Critical,
    /// Important checks
    High,
    /// Default tier for hooks that do not declare one
    Medium,
    /// Cheap or advisory checks
    Low,
    /// Best-effort checks
    Background,
}

impl Priority {
    /// All tiers in execution order
    pub const ALL: [Priority; 5] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Background,
    ];

    /// Ordinal rank (critical = 1 ... background = 5)
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
            Priority::Background => 5,
        }
    }

    /// Get the string name of this tier
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Background => "background",
        }
    }

    /// Look up a tier by its exact name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The tier executed after this one, if any
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(usize::from(self.rank())).copied()
    }

    fn index(self) -> usize {
        usize::from(self.rank()) - 1
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| {
            Error::Config(format!(
                "Unknown priority '{s}'. Valid priorities: critical, high, medium, low, background"
            ))
        })
    }
}

/// Priority as declared by a hook
///
/// Unrecognized priority strings are kept verbatim instead of being coerced
/// to a known tier, so a typo shows up as its own group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TierLabel {
    /// One of the five tiers
    Known(Priority),
    /// A priority string that names no tier
    Unknown(String),
}

impl TierLabel {
    /// Resolve a declared priority, defaulting to `medium` when absent
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            None => TierLabel::Known(Priority::Medium),
            Some(name) => Priority::from_name(name)
                .map_or_else(|| TierLabel::Unknown(name.to_string()), TierLabel::Known),
        }
    }

    /// The tier, when the label names one
    #[must_use]
    pub fn priority(&self) -> Option<Priority> {
        match self {
            TierLabel::Known(p) => Some(*p),
            TierLabel::Unknown(_) => None,
        }
    }

    /// The label as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TierLabel::Known(p) => p.name(),
            TierLabel::Unknown(raw) => raw,
        }
    }
}

impl From<Priority> for TierLabel {
    fn from(priority: Priority) -> Self {
        TierLabel::Known(priority)
    }
}

impl fmt::Display for TierLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TierLabel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TierLabel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TierLabel::resolve(Some(&raw)))
    }
}

/// How hooks inside a tier are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// One hook at a time, in declaration order
    Sequential,
    /// Up to `max_concurrency` hooks at once
    Parallel,
}

/// Execution parameters of a single tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Timeout applied to hooks that declare none
    #[serde(rename = "timeout", with = "crate::millis")]
    pub default_timeout: Duration,

    /// Maximum number of hooks running at once
    pub max_concurrency: usize,

    /// Dispatch strategy
    pub strategy: ExecutionStrategy,
}

impl TierSpec {
    /// Create a tier spec; a cap of one implies sequential dispatch
    #[must_use]
    pub fn new(default_timeout: Duration, max_concurrency: usize) -> Self {
        let strategy = if max_concurrency <= 1 {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Parallel
        };
        Self {
            default_timeout,
            max_concurrency,
            strategy,
        }
    }

    /// Validate the spec for the given tier
    ///
    /// # Errors
    ///
    /// Returns an error if the concurrency cap or the default timeout is zero,
    /// or if the critical tier would run more than one hook at a time
    pub fn validate(&self, priority: Priority) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::Config(format!(
                "Tier '{priority}' must allow at least one concurrent hook"
            )));
        }
        if priority == Priority::Critical
            && (self.max_concurrency > 1 || self.strategy == ExecutionStrategy::Parallel)
        {
            return Err(Error::Config(format!(
                "Tier '{priority}' is always sequential and cannot raise max_concurrency above 1"
            )));
        }
        if self.default_timeout.is_zero() {
            return Err(Error::Config(format!(
                "Tier '{priority}' must have a non-zero default timeout"
            )));
        }
        Ok(())
    }
}

/// The complete, fixed set of tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    specs: [TierSpec; 5],
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            specs: [
                TierSpec::new(Duration::from_millis(5_000), 1),
                TierSpec::new(Duration::from_millis(10_000), 3),
                TierSpec::new(Duration::from_millis(15_000), 5),
                TierSpec::new(Duration::from_millis(30_000), 10),
                TierSpec::new(Duration::from_millis(60_000), 10),
            ],
        }
    }
}

impl TierTable {
    /// Get the spec of a tier
    #[must_use]
    pub fn get(&self, priority: Priority) -> &TierSpec {
        &self.specs[priority.index()]
    }

    /// Replace the spec of a tier
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is invalid for that tier
    pub fn with_tier(mut self, priority: Priority, spec: TierSpec) -> Result<Self> {
        spec.validate(priority)?;
        self.specs[priority.index()] = spec;
        Ok(self)
    }

    /// Iterate tiers in execution order
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &TierSpec)> {
        Priority::ALL.into_iter().zip(self.specs.iter())
    }
}

impl Serialize for TierTable {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter().map(|(p, spec)| (p.name(), spec)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_priority_ranks_follow_execution_order() {
        let ranks: Vec<u8> = Priority::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(Priority::Critical < Priority::Background);
    }

    #[test]
    fn test_priority_next() {
        assert_eq!(Priority::Critical.next(), Some(Priority::High));
        assert_eq!(Priority::Low.next(), Some(Priority::Background));
        assert_eq!(Priority::Background.next(), None);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(err.to_string().contains("Unknown priority 'urgent'"));
    }

    #[test]
    fn test_tier_label_defaults_to_medium() {
        assert_eq!(TierLabel::resolve(None), TierLabel::Known(Priority::Medium));
    }

    #[test]
    fn test_tier_label_keeps_unknown_verbatim() {
        let label = TierLabel::resolve(Some("Critical"));
        assert_eq!(label, TierLabel::Unknown("Critical".to_string()));
        assert_eq!(label.as_str(), "Critical");
        assert_eq!(label.priority(), None);
    }

    #[test]
    fn test_tier_label_serializes_as_string() {
        let json = serde_json::to_value(TierLabel::Known(Priority::Low)).unwrap();
        assert_eq!(json, serde_json::json!("low"));
        let json = serde_json::to_value(TierLabel::Unknown("hgih".into())).unwrap();
        assert_eq!(json, serde_json::json!("hgih"));
    }

    #[test]
    fn test_default_tier_table() {
        let table = TierTable::default();
        let critical = table.get(Priority::Critical);
        assert_eq!(critical.max_concurrency, 1);
        assert_eq!(critical.strategy, ExecutionStrategy::Sequential);

        let caps: Vec<usize> = table.iter().map(|(_, s)| s.max_concurrency).collect();
        assert_eq!(caps, vec![1, 3, 5, 10, 10]);

        for (priority, spec) in table.iter() {
            if priority != Priority::Critical {
                assert_eq!(spec.strategy, ExecutionStrategy::Parallel);
            }
            assert!(spec.validate(priority).is_ok());
        }
    }

    #[test]
    fn test_with_tier_rejects_zero_concurrency() {
        let spec = TierSpec {
            default_timeout: Duration::from_secs(1),
            max_concurrency: 0,
            strategy: ExecutionStrategy::Parallel,
        };
        let err = TierTable::default()
            .with_tier(Priority::High, spec)
            .unwrap_err();
        assert!(err.to_string().contains("at least one concurrent hook"));
    }

    #[test]
    fn test_with_tier_keeps_critical_sequential() {
        let err = TierTable::default()
            .with_tier(Priority::Critical, TierSpec::new(Duration::from_secs(5), 2))
            .unwrap_err();
        assert!(err.to_string().contains("always sequential"), "{err}");

        let spec = TierSpec {
            default_timeout: Duration::from_secs(5),
            max_concurrency: 1,
            strategy: ExecutionStrategy::Parallel,
        };
        assert!(TierTable::default().with_tier(Priority::Critical, spec).is_err());

        let table = TierTable::default()
            .with_tier(Priority::Critical, TierSpec::new(Duration::from_secs(2), 1))
            .unwrap();
        let critical = table.get(Priority::Critical);
        assert_eq!(critical.strategy, ExecutionStrategy::Sequential);
        assert_eq!(critical.default_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_with_tier_replaces_spec() {
        let table = TierTable::default()
            .with_tier(Priority::High, TierSpec::new(Duration::from_secs(2), 4))
            .unwrap();
        assert_eq!(table.get(Priority::High).max_concurrency, 4);
        assert_eq!(
            table.get(Priority::High).default_timeout,
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_tier_table_serializes_in_order() {
        let json = serde_json::to_value(TierTable::default()).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(json["critical"]["timeout"], 5_000);
        assert_eq!(json["high"]["strategy"], "parallel");
    }
}
