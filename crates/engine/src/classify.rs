//! Priority classification
//!
//! Resolves every optional field of a [`HookSpec`] against the injected
//! [`SchedulerPolicy`]. Classification never fails: absent values get their
//! documented defaults and unknown priority names are kept verbatim.

use hookgate_core::{ClassifiedHook, HookSpec, Priority, SchedulerPolicy, TierLabel, UNKNOWN_FAMILY};
use indexmap::IndexMap;
use std::time::Duration;

/// Hooks grouped by tier: the five known tiers in execution order (possibly
/// empty), followed by one group per unrecognized priority name
pub type TierGroups = IndexMap<TierLabel, Vec<ClassifiedHook>>;

/// Assigns tier, family, timeout and blocking behavior to hooks
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    policy: &'a SchedulerPolicy,
    fallback_timeout: Option<Duration>,
}

impl<'a> Classifier<'a> {
    /// Create a classifier backed by `policy`
    #[must_use]
    pub fn new(policy: &'a SchedulerPolicy) -> Self {
        Self {
            policy,
            fallback_timeout: None,
        }
    }

    /// Timeout used for hooks that declare none, ahead of the tier default
    #[must_use]
    pub fn fallback_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fallback_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Classify hooks, preserving their relative order
    pub fn classify(&self, hooks: &[HookSpec]) -> Vec<ClassifiedHook> {
        hooks
            .iter()
            .enumerate()
            .map(|(index, hook)| self.classify_one(index, hook))
            .collect()
    }

    /// Classify a single hook; `index` names hooks that have no label
    pub fn classify_one(&self, index: usize, hook: &HookSpec) -> ClassifiedHook {
        let priority = TierLabel::resolve(non_blank(hook.priority.as_deref()));
        let family = non_blank(hook.family.as_deref())
            .unwrap_or(UNKNOWN_FAMILY)
            .to_string();
        let timeout = self.resolve_timeout(hook.timeout, &priority);
        let blocking_behavior = self.policy.families.resolve(&family);
        let label = hook
            .label()
            .map_or_else(|| format!("hook #{}", index + 1), str::to_string);

        tracing::trace!(
            hook = %label,
            priority = %priority,
            family = %family,
            timeout_ms = hookgate_core::millis::as_millis(timeout),
            blocking = %blocking_behavior,
            "Classified hook"
        );

        ClassifiedHook {
            label,
            command: hook.command.clone(),
            priority,
            family,
            timeout,
            blocking_behavior,
        }
    }

    /// Explicit timeout, then the configured fallback, then the tier default.
    /// Unknown tiers borrow the `medium` default; they are never executed.
    fn resolve_timeout(&self, explicit_ms: Option<u64>, priority: &TierLabel) -> Duration {
        if let Some(ms) = explicit_ms.filter(|ms| *ms > 0) {
            return Duration::from_millis(ms);
        }
        if let Some(fallback) = self.fallback_timeout {
            return fallback;
        }
        let tier = priority.priority().unwrap_or(Priority::Medium);
        self.policy.tiers.get(tier).default_timeout
    }

    /// Group classified hooks by tier
    ///
    /// Every known tier gets an entry, even when empty. Hooks with an
    /// unrecognized priority get an extra entry under that literal name.
    pub fn group_by_priority(hooks: &[ClassifiedHook]) -> TierGroups {
        let mut groups: TierGroups = Priority::ALL
            .into_iter()
            .map(|p| (TierLabel::Known(p), Vec::new()))
            .collect();

        for hook in hooks {
            groups
                .entry(hook.priority.clone())
                .or_default()
                .push(hook.clone());
        }

        groups
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
