//! Core types for hookgate
//!
//! This is the foundation crate (Layer 0) that all other hookgate crates depend on.
//! It provides:
//! - Hook descriptors (declared and classified)
//! - Priority tiers and the family blocking policy
//! - Execution results, aggregate reports and performance statistics
//! - Base error types
//!
//! This crate has no dependencies on other hookgate crates.

pub mod error;
pub mod family;
pub mod hook;
pub mod millis;
pub mod payload;
pub mod policy;
pub mod report;
pub mod result;
pub mod tier;

pub use error::{Error, HookError, Result};
pub use family::{BlockingBehavior, FamilyPolicy, UNKNOWN_FAMILY};
pub use hook::{ClassifiedHook, HookSpec};
pub use payload::Payload;
pub use policy::SchedulerPolicy;
pub use report::{
    AggregateReport, ParallelEfficiency, PerformanceStats, PriorityBreakdown, SkipReason,
    SkippedHook,
};
pub use result::{BLOCK_EXIT_CODE, ExecutionResult, FailureKind, Outcome};
pub use tier::{ExecutionStrategy, Priority, TierLabel, TierSpec, TierTable};
