//! Result aggregation
//!
//! Pure folds from per-hook results to the run report and its derived
//! statistics. Nothing here touches the clock or the process table.

use hookgate_core::{
    AggregateReport, ExecutionResult, Outcome, ParallelEfficiency, PerformanceStats,
    PriorityBreakdown, TierLabel,
};
use indexmap::IndexMap;

/// Fold per-hook results into a single report
///
/// Results are partitioned into `blocks`, `errors` and `successful`, each
/// keeping the order in which the results were given. The report's
/// `skipped` and `halted_at` fields are left empty for the caller to fill.
#[must_use]
pub fn merge(results: Vec<ExecutionResult>) -> AggregateReport {
    let total_hooks = results.len();
    let total_duration: u64 = results.iter().map(|r| r.duration).sum();
    let max_duration = results.iter().map(|r| r.duration).max();

    let parallel_efficiency = match max_duration {
        Some(max) if total_hooks > 1 => ParallelEfficiency::ratio(total_duration, max),
        _ => ParallelEfficiency::unmeasured(),
    };

    let mut blocks = Vec::new();
    let mut errors = Vec::new();
    let mut successful = Vec::new();
    for result in results {
        match result.outcome() {
            Outcome::Blocked => blocks.push(result),
            Outcome::Failed => errors.push(result),
            Outcome::Success => successful.push(result),
        }
    }

    AggregateReport {
        success: blocks.is_empty() && errors.is_empty(),
        blocked: !blocks.is_empty(),
        blocks,
        errors,
        successful,
        total_hooks,
        total_duration,
        max_duration,
        parallel_efficiency,
        skipped: Vec::new(),
        halted_at: None,
    }
}

/// Derive observability statistics from a finished report
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn performance_stats(report: &AggregateReport) -> PerformanceStats {
    let (average_duration, success_rate) = if report.total_hooks == 0 {
        (0.0, "100.0%".to_string())
    } else {
        let hooks = report.total_hooks as f64;
        (
            report.total_duration as f64 / hooks,
            format!("{:.1}%", report.successful.len() as f64 / hooks * 100.0),
        )
    };

    PerformanceStats {
        total_hooks: report.total_hooks,
        total_duration: report.total_duration,
        max_duration: report.max_duration,
        average_duration,
        success_rate,
        parallel_efficiency: report.parallel_efficiency,
        by_priority: breakdown_by_priority(report.results()),
    }
}

fn breakdown_by_priority<'a>(
    results: impl Iterator<Item = &'a ExecutionResult>,
) -> IndexMap<String, PriorityBreakdown> {
    let mut groups: IndexMap<&TierLabel, PriorityBreakdown> = IndexMap::new();
    for result in results {
        let entry = groups.entry(&result.priority).or_default();
        entry.hooks += 1;
        entry.total_duration += result.duration;
        entry.max_duration = entry.max_duration.max(result.duration);
        match result.outcome() {
            Outcome::Success => entry.successful += 1,
            Outcome::Blocked => entry.blocked += 1,
            Outcome::Failed => entry.failed += 1,
        }
    }

    // Known tiers by rank, unrecognized labels after them in first-seen order
    groups.sort_by(|a, _, b, _| {
        let rank = |label: &TierLabel| label.priority().map_or(u8::MAX, |p| p.rank());
        rank(*a).cmp(&rank(*b))
    });

    groups
        .into_iter()
        .map(|(label, breakdown)| (label.as_str().to_string(), breakdown))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookgate_core::{BlockingBehavior, ClassifiedHook, HookError, Priority};
    use std::time::Duration;

    fn classified(label: &str, priority: TierLabel) -> ClassifiedHook {
        ClassifiedHook {
            label: label.to_string(),
            command: Some(label.to_string()),
            priority,
            family: "linting".to_string(),
            timeout: Duration::from_secs(1),
            blocking_behavior: BlockingBehavior::Warning,
        }
    }

    fn exited(label: &str, priority: Priority, code: i32, ms: u64) -> ExecutionResult {
        ExecutionResult::from_exit_code(
            &classified(label, priority.into()),
            code,
            Duration::from_millis(ms),
            None,
        )
    }

    #[test]
    fn test_merge_durations_and_efficiency() {
        let report = merge(vec![
            exited("a", Priority::High, 0, 100),
            exited("b", Priority::High, 0, 200),
            exited("c", Priority::High, 0, 150),
            exited("d", Priority::High, 0, 50),
        ]);

        assert_eq!(report.total_hooks, 4);
        assert_eq!(report.total_duration, 500);
        assert_eq!(report.max_duration, Some(200));
        assert_eq!(report.parallel_efficiency.to_string(), "2.50");
        assert!(report.success);
        assert!(!report.blocked);
    }

    #[test]
    fn test_merge_empty() {
        let report = merge(Vec::new());
        assert!(report.success);
        assert!(!report.blocked);
        assert_eq!(report.total_hooks, 0);
        assert_eq!(report.total_duration, 0);
        assert_eq!(report.max_duration, None);
        assert_eq!(report.parallel_efficiency.to_string(), "1");
    }

    #[test]
    fn test_merge_single_result_efficiency() {
        let report = merge(vec![exited("only", Priority::Low, 0, 300)]);
        assert_eq!(report.max_duration, Some(300));
        assert_eq!(report.parallel_efficiency.to_string(), "1");
    }

    #[test]
    fn test_merge_all_zero_durations() {
        let report = merge(vec![
            exited("a", Priority::Low, 0, 0),
            exited("b", Priority::Low, 0, 0),
        ]);
        assert_eq!(report.parallel_efficiency.to_string(), "1");
    }

    #[test]
    fn test_merge_partitions_and_flags() {
        let hook = classified("missing", Priority::Medium.into());
        let report = merge(vec![
            exited("ok", Priority::High, 0, 10),
            exited("block", Priority::High, 2, 20),
            exited("crash", Priority::High, 1, 30),
            ExecutionResult::from_error(&hook, &HookError::NoCommand, Duration::ZERO, None),
        ]);

        assert!(!report.success);
        assert!(report.blocked);
        assert_eq!(report.blocks.len(), 1);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.blocks[0].hook, "block");
        assert_eq!(report.errors[0].hook, "crash");
        assert_eq!(report.errors[1].hook, "missing");
    }

    #[test]
    fn test_errors_without_blocks_are_not_blocked() {
        let report = merge(vec![exited("crash", Priority::High, 127, 5)]);
        assert!(!report.success);
        assert!(!report.blocked);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = merge(vec![
            exited("a", Priority::High, 0, 40),
            exited("b", Priority::High, 0, 10),
        ]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalHooks"], 2);
        assert_eq!(json["totalDuration"], 50);
        assert_eq!(json["maxDuration"], 40);
        assert_eq!(json["parallelEfficiency"], "1.25");
        assert_eq!(json["haltedAt"], serde_json::Value::Null);
        assert_eq!(json["successful"][0]["exitCode"], 0);
    }

    #[test]
    fn test_performance_stats() {
        let report = merge(vec![
            exited("a", Priority::Low, 0, 100),
            exited("b", Priority::Critical, 0, 300),
            exited("c", Priority::Low, 2, 200),
            exited("d", Priority::High, 1, 400),
        ]);
        let stats = performance_stats(&report);

        assert_eq!(stats.total_hooks, 4);
        assert!((stats.average_duration - 250.0).abs() < f64::EPSILON);
        assert_eq!(stats.success_rate, "50.0%");
        assert_eq!(stats.parallel_efficiency.to_string(), "2.50");

        let tiers: Vec<&str> = stats.by_priority.keys().map(String::as_str).collect();
        assert_eq!(tiers, vec!["critical", "high", "low"]);

        let low = &stats.by_priority["low"];
        assert_eq!(low.hooks, 2);
        assert_eq!(low.successful, 1);
        assert_eq!(low.blocked, 1);
        assert_eq!(low.total_duration, 300);
        assert_eq!(low.max_duration, 200);
    }

    #[test]
    fn test_performance_stats_unknown_tier_sorted_last() {
        let unknown = classified("odd", TierLabel::Unknown("urgent".to_string()));
        let report = merge(vec![
            ExecutionResult::from_exit_code(&unknown, 0, Duration::from_millis(5), None),
            exited("bg", Priority::Background, 0, 5),
        ]);
        let stats = performance_stats(&report);
        let tiers: Vec<&str> = stats.by_priority.keys().map(String::as_str).collect();
        assert_eq!(tiers, vec!["background", "urgent"]);
    }

    #[test]
    fn test_performance_stats_empty() {
        let stats = performance_stats(&merge(Vec::new()));
        assert_eq!(stats.total_hooks, 0);
        assert!(stats.average_duration.abs() < f64::EPSILON);
        assert_eq!(stats.success_rate, "100.0%");
        assert!(stats.by_priority.is_empty());
    }
}
