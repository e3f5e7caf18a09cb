//! # Hookgate Engine
//!
//! Tiered scheduler for validation hooks.
//!
//! A run takes a list of hook descriptors and one JSON payload, executes the
//! hooks tier by tier and returns a single aggregate report.
//!
//! ## Execution Model
//!
//! - Tiers run strictly in order: `critical`, `high`, `medium`, `low`, `background`
//! - Hooks within a tier run **in parallel**, bounded by the tier's concurrency cap
//!   (`critical` is sequential)
//! - Every hook gets its own deadline; a timeout never cancels its siblings
//! - Exit code `0` passes, `2` blocks, anything else fails
//! - A blocked hook, or a failed hook of a hard-blocking family, stops every later tier
//!
//! ## Module Organization
//!
//! - `classify`: priority, family, timeout and blocking resolution; tier grouping
//! - `task`: the [`Task`] abstraction with subprocess and in-process implementations
//! - `executor`: bounded parallel execution of one tier
//! - `pipeline`: tier ordering, the stop gate and input validation
//! - `aggregate`: report merging and performance statistics

pub mod aggregate;
pub mod classify;
pub mod executor;
pub mod pipeline;
pub mod task;

// Re-export error types from core
pub use hookgate_core::{Error, Result};

// Re-export main types for convenience
pub use aggregate::{merge, performance_stats};
pub use classify::{Classifier, TierGroups};
pub use executor::{PoolBuilder, TierExecutor, rayon_pool};
pub use pipeline::{
    Gate, Pipeline, PipelineBuilder, PipelineState, RunOptions, gate, parse_hooks, run_hooks,
};
pub use task::{
    CancelToken, CommandResolver, CommandTask, InProcessTask, Task, TaskOutcome, TaskRegistry,
    TaskResolver,
};
