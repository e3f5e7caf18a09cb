//! Base error types for hookgate
//!
//! Two families of errors live here:
//!
//! - [`Error`]: scheduler-level failures. These are the only errors a pipeline
//!   run can return, and they are raised before any hook is started
//!   (malformed input, invalid configuration, worker pool creation).
//! - [`HookError`]: per-hook failures. These never escape the scheduler; they
//!   are rendered into [`ExecutionResult`](crate::result::ExecutionResult)
//!   and surfaced through the aggregate report.

use crate::result::FailureKind;
use thiserror::Error;

/// Scheduler-level error type
#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be turned into a hook list
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (tier overrides, family policy, options)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bounded worker pool could not be created
    #[error("Worker pool error: {0}")]
    Pool(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single hook failed
///
/// A policy violation (exit code 2) is deliberately absent: it is a
/// successful detection, recorded as `blocked` rather than as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Descriptor has no command; nothing was spawned
    #[error("No command specified")]
    NoCommand,

    /// Command string could not be parsed into a program and arguments
    #[error("Invalid command '{command}': {reason}")]
    InvalidCommand {
        /// Command string as declared
        command: String,
        /// Why it could not be split
        reason: String,
    },

    /// Command could not be started
    #[error("Failed to start '{command}': {reason}")]
    Spawn {
        /// Command string as declared
        command: String,
        /// Why the command could not be started
        reason: String,
    },

    /// Deadline expired before the invocation exited
    #[error("Hook timed out after {timeout_ms}ms")]
    TimedOut {
        /// Deadline that expired, in milliseconds
        timeout_ms: u64,
    },

    /// Invocation exited with a code other than 0 or 2
    #[error("Hook exited with code {code}")]
    NonZeroExit {
        /// Exit code reported by the invocation
        code: i32,
    },

    /// Invocation ended without an exit code (e.g. killed by a signal)
    #[error("Hook terminated abnormally: {0}")]
    Terminated(String),
}

impl HookError {
    /// Map this error onto the failure taxonomy used in reports
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            HookError::NoCommand => FailureKind::Configuration,
            HookError::InvalidCommand { .. } | HookError::Spawn { .. } => FailureKind::Spawn,
            HookError::TimedOut { .. } => FailureKind::Timeout,
            HookError::NonZeroExit { .. } | HookError::Terminated(_) => FailureKind::Execution,
        }
    }
}
