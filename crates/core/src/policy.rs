//! Immutable scheduler policy
//!
//! Built once (defaults, optionally overridden from configuration) and passed
//! by reference into the classifier and executors. Nothing mutates it after
//! construction, so concurrent hooks read it without synchronization.

use crate::family::FamilyPolicy;
use crate::tier::TierTable;
use serde::Serialize;

/// Tier table plus family policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerPolicy {
    /// Per-tier timeouts, caps and strategies
    pub tiers: TierTable,
    /// Family → blocking behavior
    pub families: FamilyPolicy,
}

impl SchedulerPolicy {
    /// Create a policy from its parts
    #[must_use]
    pub fn new(tiers: TierTable, families: FamilyPolicy) -> Self {
        Self { tiers, families }
    }
}
