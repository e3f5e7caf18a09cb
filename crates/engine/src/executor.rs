//! Tier execution
//!
//! Runs every hook of one tier against the shared payload and returns one
//! result per hook, in input order. Parallel tiers are dispatched on a rayon
//! pool sized to the tier's concurrency cap, so hooks beyond the cap queue
//! until a worker frees up. Sequential tiers run on the calling thread.

use crate::task::{TaskOutcome, TaskResolver};
use hookgate_core::millis::as_millis;
use hookgate_core::{
    ClassifiedHook, Error, ExecutionResult, ExecutionStrategy, HookError, Outcome, Payload,
    Priority, Result, TierSpec,
};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Builds the bounded worker pool of a parallel tier from its priority and
/// worker count
pub type PoolBuilder = fn(Priority, usize) -> Result<rayon::ThreadPool>;

/// Default [`PoolBuilder`]: a dedicated rayon pool with named threads
///
/// # Errors
///
/// Returns [`Error::Pool`] if the worker threads cannot be spawned
pub fn rayon_pool(priority: Priority, workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("hookgate-{priority}-{i}"))
        .build()
        .map_err(|e| {
            Error::Pool(format!(
                "Failed to create worker pool for tier '{priority}': {e}"
            ))
        })
}

/// Runs the hooks of a single tier
#[derive(Clone, Copy)]
pub struct TierExecutor<'a> {
    resolver: &'a dyn TaskResolver,
    pool_builder: PoolBuilder,
    verbose: bool,
}

impl<'a> TierExecutor<'a> {
    /// Create an executor resolving commands through `resolver`
    pub fn new(resolver: &'a dyn TaskResolver) -> Self {
        Self {
            resolver,
            pool_builder: rayon_pool,
            verbose: false,
        }
    }

    /// Replace how parallel tiers get their worker pool
    #[must_use]
    pub fn pool_builder(mut self, pool_builder: PoolBuilder) -> Self {
        self.pool_builder = pool_builder;
        self
    }

    /// Report per-hook progress at info level instead of debug
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run all hooks of a tier and wait for every one to finish
    ///
    /// # Errors
    ///
    /// Returns an error only if the bounded worker pool cannot be created.
    /// Hook failures are recorded in the returned results.
    #[tracing::instrument(skip_all, fields(tier = %priority, hooks = hooks.len()))]
    pub fn run_tier(
        &self,
        priority: Priority,
        spec: &TierSpec,
        hooks: &[ClassifiedHook],
        payload: &Payload,
    ) -> Result<Vec<ExecutionResult>> {
        if hooks.is_empty() {
            return Ok(Vec::new());
        }

        match spec.strategy {
            ExecutionStrategy::Sequential => {
                tracing::debug!("Executing tier sequentially");
                Ok(self.run_sequential(hooks, payload))
            }
            ExecutionStrategy::Parallel => {
                let workers = spec.max_concurrency.clamp(1, hooks.len());
                tracing::debug!(workers, "Executing tier in parallel");

                let pool = (self.pool_builder)(priority, workers)?;

                // collect() keeps input order regardless of completion order
                Ok(pool.install(|| {
                    hooks
                        .par_iter()
                        .map(|hook| self.run_hook(hook, payload))
                        .collect()
                }))
            }
        }
    }

    /// Run hooks one after another on the calling thread
    pub fn run_sequential(
        &self,
        hooks: &[ClassifiedHook],
        payload: &Payload,
    ) -> Vec<ExecutionResult> {
        hooks
            .iter()
            .map(|hook| self.run_hook(hook, payload))
            .collect()
    }

    /// Run a single hook to a terminal state
    pub fn run_hook(&self, hook: &ClassifiedHook, payload: &Payload) -> ExecutionResult {
        let span = tracing::info_span!(
            "hook_execution",
            hook = %hook.label,
            tier = %hook.priority,
            family = %hook.family,
            timeout_ms = as_millis(hook.timeout),
        );
        let _guard = span.enter();

        let Some(command) = hook.command.as_deref().filter(|c| !c.trim().is_empty()) else {
            let result =
                ExecutionResult::from_error(hook, &HookError::NoCommand, Duration::ZERO, None);
            self.log_result(&result);
            return result;
        };

        let task = match self.resolver.resolve(command, hook) {
            Ok(task) => task,
            Err(e) => {
                let result = ExecutionResult::from_error(hook, &e, Duration::ZERO, None);
                self.log_result(&result);
                return result;
            }
        };

        if self.verbose {
            tracing::info!("Starting hook");
        } else {
            tracing::debug!("Starting hook");
        }

        let start = Instant::now();
        let outcome = task.execute(payload, hook.timeout);
        let elapsed = start.elapsed();

        let result = match outcome {
            TaskOutcome::Exited { code, output } => {
                ExecutionResult::from_exit_code(hook, code, elapsed, output)
            }
            TaskOutcome::Terminated(detail) => {
                ExecutionResult::from_error(hook, &HookError::Terminated(detail), elapsed, None)
            }
            TaskOutcome::SpawnFailed(reason) => ExecutionResult::from_error(
                hook,
                &HookError::Spawn {
                    command: command.to_string(),
                    reason,
                },
                Duration::ZERO,
                None,
            ),
            TaskOutcome::TimedOut => ExecutionResult::from_error(
                hook,
                &HookError::TimedOut {
                    timeout_ms: as_millis(hook.timeout),
                },
                elapsed.max(hook.timeout),
                None,
            ),
        };

        self.log_result(&result);
        result
    }

    fn log_result(&self, result: &ExecutionResult) {
        match result.outcome() {
            Outcome::Success => {
                if self.verbose {
                    tracing::info!(elapsed_ms = result.duration, "Hook passed");
                } else {
                    tracing::debug!(elapsed_ms = result.duration, "Hook passed");
                }
            }
            Outcome::Blocked => {
                tracing::warn!(
                    elapsed_ms = result.duration,
                    output = result.output.as_deref().unwrap_or_default(),
                    "Hook reported a policy violation"
                );
            }
            Outcome::Failed => {
                tracing::warn!(
                    elapsed_ms = result.duration,
                    error = result.error.as_deref().unwrap_or_default(),
                    "Hook failed"
                );
            }
        }
    }
}
