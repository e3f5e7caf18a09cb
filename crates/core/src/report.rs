//! Aggregate report and derived performance statistics

use crate::result::ExecutionResult;
use crate::tier::{Priority, TierLabel};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Ratio of total hook time to the longest single hook
///
/// Displays with two decimals, or as `1` when no parallelism was possible
/// (zero or one result, or nothing measurable).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParallelEfficiency(Option<f64>);

impl ParallelEfficiency {
    /// No parallelism measured
    #[must_use]
    pub fn unmeasured() -> Self {
        Self(None)
    }

    /// `total / max`, unmeasured when `max` is zero
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(total: u64, max: u64) -> Self {
        if max == 0 {
            Self(None)
        } else {
            Self(Some(total as f64 / max as f64))
        }
    }

    /// Numeric value (1.0 when unmeasured)
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0.unwrap_or(1.0)
    }
}

impl fmt::Display for ParallelEfficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ratio) => write!(f, "{ratio:.2}"),
            None => f.write_str("1"),
        }
    }
}

impl Serialize for ParallelEfficiency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Why a hook never ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// An earlier tier stopped the pipeline
    PipelineBlocked,
    /// The declared priority names no tier
    UnknownPriority,
}

impl SkipReason {
    /// Get the string name of this reason
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PipelineBlocked => "pipeline-blocked",
            Self::UnknownPriority => "unknown-priority",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A hook that was never executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedHook {
    /// Hook label
    pub hook: String,
    /// Declared tier
    pub priority: TierLabel,
    /// Why it did not run
    pub reason: SkipReason,
}

/// Terminal artifact of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    /// No result is blocked or failed, and the pipeline was not halted
    pub success: bool,
    /// At least one result is blocked
    pub blocked: bool,
    /// Blocked results
    pub blocks: Vec<ExecutionResult>,
    /// Failed results
    pub errors: Vec<ExecutionResult>,
    /// Successful results
    pub successful: Vec<ExecutionResult>,
    /// Number of executed hooks
    pub total_hooks: usize,
    /// Sum of all durations (ms)
    pub total_duration: u64,
    /// Longest single duration (ms); `None` when nothing was measured
    pub max_duration: Option<u64>,
    /// `total_duration / max_duration`
    pub parallel_efficiency: ParallelEfficiency,
    /// Hooks that never ran
    pub skipped: Vec<SkippedHook>,
    /// Tier at which the pipeline stopped, if it stopped early
    pub halted_at: Option<Priority>,
}

impl AggregateReport {
    /// Report of a run with no hooks
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: true,
            blocked: false,
            blocks: Vec::new(),
            errors: Vec::new(),
            successful: Vec::new(),
            total_hooks: 0,
            total_duration: 0,
            max_duration: None,
            parallel_efficiency: ParallelEfficiency::unmeasured(),
            skipped: Vec::new(),
            halted_at: None,
        }
    }

    /// All executed results (blocks, then errors, then successes)
    pub fn results(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.blocks
            .iter()
            .chain(self.errors.iter())
            .chain(self.successful.iter())
    }
}

/// Per-tier breakdown inside [`PerformanceStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    /// Executed hooks in this tier
    pub hooks: usize,
    /// Successful hooks
    pub successful: usize,
    /// Blocked hooks
    pub blocked: usize,
    /// Failed hooks
    pub failed: usize,
    /// Sum of durations (ms)
    pub total_duration: u64,
    /// Longest duration (ms)
    pub max_duration: u64,
}

/// Read-only statistics derived from a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    /// Number of executed hooks
    pub total_hooks: usize,
    /// Sum of all durations (ms)
    pub total_duration: u64,
    /// Longest single duration (ms)
    pub max_duration: Option<u64>,
    /// Mean duration (ms)
    pub average_duration: f64,
    /// Share of successful hooks, as a percentage string
    pub success_rate: String,
    /// `total_duration / max_duration`
    pub parallel_efficiency: ParallelEfficiency,
    /// Results grouped by tier, in execution order
    pub by_priority: IndexMap<String, PriorityBreakdown>,
}
