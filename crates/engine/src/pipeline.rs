//! Pipeline orchestration
//!
//! Tiers run strictly in order: critical, high, medium, low, background.
//! Each tier is awaited in full before the next starts. After every tier a
//! gate decides whether the pipeline continues. A blocked hook, or a failed
//! hook whose family is hard-blocking, halts the pipeline and every later
//! tier is reported as skipped.

use crate::aggregate;
use crate::classify::Classifier;
use crate::executor::{PoolBuilder, TierExecutor, rayon_pool};
use crate::task::{CommandResolver, TaskResolver};
use hookgate_core::{
    AggregateReport, BlockingBehavior, ClassifiedHook, Error, ExecutionResult, HookSpec, Payload,
    Priority, Result, SchedulerPolicy, SkipReason, SkippedHook,
};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Per-run options supplied by the caller
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Report per-hook progress at info level
    pub verbose: bool,
    /// Timeout for hooks that declare none, ahead of the tier default
    pub timeout: Option<Duration>,
    /// Run a tier sequentially when its worker pool cannot be created
    pub fallback_to_sequential: bool,
    /// Extra environment for command hooks
    pub env: IndexMap<String, String>,
    /// Working directory for command hooks
    pub working_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            timeout: None,
            fallback_to_sequential: true,
            env: IndexMap::new(),
            working_dir: None,
        }
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No tier has started
    Idle,
    /// A tier is executing
    RunningTier(Priority),
    /// A tier stopped the pipeline; later tiers are skipped
    Blocked(Priority),
    /// Every runnable tier finished without a stop
    Completed,
}

/// Decision taken after a tier finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Proceed to the next tier
    Continue,
    /// Skip every remaining tier
    Halt,
}

/// Decide whether the pipeline may proceed past a finished tier
///
/// `results[i]` must belong to `hooks[i]`.
#[must_use]
pub fn gate(hooks: &[ClassifiedHook], results: &[ExecutionResult]) -> Gate {
    let halt = hooks.iter().zip(results).any(|(hook, result)| {
        result.blocked || (result.failed && hook.blocking_behavior == BlockingBehavior::HardBlock)
    });
    if halt { Gate::Halt } else { Gate::Continue }
}

/// Validate an untyped hook list
///
/// `null` is an empty list. Anything else must be an array of objects whose
/// fields have the expected types.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming the first offending element.
pub fn parse_hooks(hooks: &Value) -> Result<Vec<HookSpec>> {
    let items = match hooks {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(Error::InvalidInput(format!(
                "hooks must be an array, got {}",
                json_type(other)
            )));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(Error::InvalidInput(format!(
                    "hook at index {index} must be an object, got {}",
                    json_type(item)
                )));
            }
            serde_json::from_value::<HookSpec>(item.clone())
                .map_err(|e| Error::InvalidInput(format!("hook at index {index}: {e}")))
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The tiered hook scheduler
pub struct Pipeline {
    policy: SchedulerPolicy,
    options: RunOptions,
    resolver: Arc<dyn TaskResolver>,
    pool_builder: PoolBuilder,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("policy", &self.policy)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    policy: Option<SchedulerPolicy>,
    options: RunOptions,
    resolver: Option<Arc<dyn TaskResolver>>,
    pool_builder: Option<PoolBuilder>,
}

impl PipelineBuilder {
    /// Tier and family tables (defaults when not set)
    #[must_use]
    pub fn policy(mut self, policy: SchedulerPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Per-run options
    #[must_use]
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// How commands become runnable tasks
    ///
    /// Defaults to a [`CommandResolver`] configured from the run options.
    #[must_use]
    pub fn resolver(mut self, resolver: impl TaskResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// How parallel tiers get their worker pool (a rayon pool by default)
    #[must_use]
    pub fn pool_builder(mut self, pool_builder: PoolBuilder) -> Self {
        self.pool_builder = Some(pool_builder);
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Pipeline {
        let resolver = self.resolver.unwrap_or_else(|| {
            let mut commands = CommandResolver::new().env_vars(self.options.env.clone());
            if let Some(dir) = &self.options.working_dir {
                commands = commands.working_dir(dir.clone());
            }
            Arc::new(commands)
        });

        Pipeline {
            policy: self.policy.unwrap_or_default(),
            options: self.options,
            resolver,
            pool_builder: self.pool_builder.unwrap_or(rayon_pool),
        }
    }
}

impl Pipeline {
    /// A pipeline with the default policy and external command hooks
    #[must_use]
    pub fn new(options: RunOptions) -> Self {
        Self::builder().options(options).build()
    }

    /// Start building a pipeline with custom policy or resolver
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The tier and family tables in effect
    #[must_use]
    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    /// The run options in effect
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Classifier configured with this pipeline's policy and timeout fallback
    #[must_use]
    pub fn classifier(&self) -> Classifier<'_> {
        Classifier::new(&self.policy).fallback_timeout(self.options.timeout)
    }

    /// Validate an untyped hook list, then run it
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] before anything runs if the list is
    /// malformed, otherwise as [`Pipeline::run`].
    pub fn run_json(&self, hooks: &Value, payload: &Payload) -> Result<AggregateReport> {
        let hooks = parse_hooks(hooks)?;
        self.run(&hooks, payload)
    }

    /// Run every hook tier by tier and fold the results into a report
    ///
    /// Hook failures never surface here; they are recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pool`] if a tier's worker pool cannot be created and
    /// sequential fallback is disabled.
    #[tracing::instrument(name = "pipeline", skip_all, fields(hooks = hooks.len()))]
    pub fn run(&self, hooks: &[HookSpec], payload: &Payload) -> Result<AggregateReport> {
        let classified = self.classifier().classify(hooks);
        let groups = Classifier::group_by_priority(&classified);
        let executor = TierExecutor::new(&*self.resolver)
            .pool_builder(self.pool_builder)
            .verbose(self.options.verbose);

        let mut state = PipelineState::Idle;
        let mut results = Vec::with_capacity(classified.len());
        let mut skipped = Vec::new();

        for (label, tier_hooks) in groups {
            let Some(priority) = label.priority() else {
                tracing::warn!(
                    priority = %label,
                    hooks = tier_hooks.len(),
                    "Skipping hooks with unrecognized priority"
                );
                skipped.extend(skip(&tier_hooks, SkipReason::UnknownPriority));
                continue;
            };

            if let PipelineState::Blocked(_) = state {
                skipped.extend(skip(&tier_hooks, SkipReason::PipelineBlocked));
                continue;
            }
            if tier_hooks.is_empty() {
                continue;
            }

            state = PipelineState::RunningTier(priority);
            tracing::debug!(?state, hooks = tier_hooks.len(), "Running tier");

            let tier_results = self.execute_tier(&executor, priority, &tier_hooks, payload)?;
            let decision = gate(&tier_hooks, &tier_results);
            results.extend(tier_results);

            if decision == Gate::Halt {
                state = PipelineState::Blocked(priority);
                tracing::info!(tier = %priority, "Pipeline halted");
            }
        }

        let halted_at = match state {
            PipelineState::Blocked(priority) => Some(priority),
            _ => {
                state = PipelineState::Completed;
                None
            }
        };
        tracing::debug!(?state, "Pipeline finished");

        let mut report = aggregate::merge(results);
        report.success &= halted_at.is_none();
        report.halted_at = halted_at;
        report.skipped = skipped;
        Ok(report)
    }

    fn execute_tier(
        &self,
        executor: &TierExecutor<'_>,
        priority: Priority,
        hooks: &[ClassifiedHook],
        payload: &Payload,
    ) -> Result<Vec<ExecutionResult>> {
        let spec = self.policy.tiers.get(priority);
        match executor.run_tier(priority, spec, hooks, payload) {
            Err(Error::Pool(reason)) if self.options.fallback_to_sequential => {
                tracing::warn!(tier = %priority, %reason, "Falling back to sequential execution");
                Ok(executor.run_sequential(hooks, payload))
            }
            other => other,
        }
    }
}

fn skip(hooks: &[ClassifiedHook], reason: SkipReason) -> impl Iterator<Item = SkippedHook> + '_ {
    hooks.iter().map(move |hook| SkippedHook {
        hook: hook.label.clone(),
        priority: hook.priority.clone(),
        reason,
    })
}

/// Run hooks with the default policy and external command execution
///
/// # Errors
///
/// See [`Pipeline::run`].
pub fn run_hooks(
    hooks: &[HookSpec],
    payload: impl Into<Payload>,
    options: RunOptions,
) -> Result<AggregateReport> {
    Pipeline::new(options).run(hooks, &payload.into())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookgate_core::{FailureKind, HookError, TierLabel};
    use serde_json::json;

    fn classified(family_behavior: BlockingBehavior) -> ClassifiedHook {
        ClassifiedHook {
            label: "h".to_string(),
            command: Some("h".to_string()),
            priority: TierLabel::Known(Priority::High),
            family: "any".to_string(),
            timeout: Duration::from_secs(1),
            blocking_behavior: family_behavior,
        }
    }

    #[test]
    fn test_gate_continues_on_success() {
        let hook = classified(BlockingBehavior::HardBlock);
        let result = ExecutionResult::from_exit_code(&hook, 0, Duration::ZERO, None);
        assert_eq!(gate(&[hook], &[result]), Gate::Continue);
    }

    #[test]
    fn test_gate_halts_on_block_regardless_of_family() {
        let hook = classified(BlockingBehavior::None);
        let result = ExecutionResult::from_exit_code(&hook, 2, Duration::ZERO, None);
        assert_eq!(gate(&[hook], &[result]), Gate::Halt);
    }

    #[test]
    fn test_gate_failure_depends_on_family() {
        for (behavior, expected) in [
            (BlockingBehavior::HardBlock, Gate::Halt),
            (BlockingBehavior::SoftBlock, Gate::Continue),
            (BlockingBehavior::Warning, Gate::Continue),
            (BlockingBehavior::None, Gate::Continue),
        ] {
            let hook = classified(behavior);
            let result = ExecutionResult::from_error(
                &hook,
                &HookError::TimedOut { timeout_ms: 5 },
                Duration::from_millis(5),
                None,
            );
            assert_eq!(result.failure, Some(FailureKind::Timeout));
            assert_eq!(gate(&[hook], &[result]), expected, "{behavior}");
        }
    }

    #[test]
    fn test_parse_hooks_null_is_empty() {
        assert!(parse_hooks(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_parse_hooks_rejects_non_array() {
        let err = parse_hooks(&json!({"command": "x"})).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_parse_hooks_names_bad_index() {
        let err = parse_hooks(&json!([{"command": "ok"}, "nope"])).unwrap_err();
        assert!(err.to_string().contains("index 1"), "{err}");

        let err = parse_hooks(&json!([{"command": "ok", "timeout": "soon"}])).unwrap_err();
        assert!(err.to_string().contains("index 0"), "{err}");
    }

    #[test]
    fn test_parse_hooks_accepts_partial_objects() {
        let hooks = parse_hooks(&json!([
            {"command": "a", "priority": "critical", "family": "security", "timeout": 100},
            {"description": "no command"},
            {}
        ]))
        .unwrap();
        assert_eq!(hooks.len(), 3);
        assert_eq!(hooks[0].timeout, Some(100));
        assert_eq!(hooks[1].command, None);
    }

    #[test]
    fn test_run_options_defaults() {
        let options = RunOptions::default();
        assert!(!options.verbose);
        assert!(options.fallback_to_sequential);
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_classifier_uses_option_timeout() {
        let pipeline = Pipeline::new(RunOptions {
            timeout: Some(Duration::from_millis(1234)),
            ..RunOptions::default()
        });
        let hooks = pipeline
            .classifier()
            .classify(&[HookSpec::new("x"), HookSpec::new("y").timeout_ms(10)]);
        assert_eq!(hooks[0].timeout, Duration::from_millis(1234));
        assert_eq!(hooks[1].timeout, Duration::from_millis(10));
    }
}
