//! Run command
//!
//! Loads the configured hooks, reads the payload and runs the pipeline.

use anyhow::{Context, Result};
use clap::Args;
use hookgate_config::Config;
use hookgate_core::{
    AggregateReport, ExecutionResult, Payload, PerformanceStats, SchedulerPolicy, TierSpec,
};
use hookgate_engine::{Pipeline, performance_stats};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{EXIT_BLOCKED, EXIT_FAILED, EXIT_SUCCESS, OutputFormat};

/// Run the configured hooks
#[derive(Debug, Args)]
pub struct RunCommand {
    /// JSON payload file, or `-` for stdin (default: stdin unless it is a terminal)
    #[arg(long, value_name = "FILE")]
    pub payload: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Run every tier one hook at a time
    #[arg(long)]
    pub sequential: bool,

    /// Timeout in milliseconds for hooks that declare none
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,
}

impl RunCommand {
    /// Run the pipeline and return the process exit status
    pub fn execute(&self, config: &Config, verbose: bool) -> Result<i32> {
        let payload = read_payload(self.payload.as_deref())?;

        let mut policy = config.policy().context("Invalid tier or family configuration")?;
        if self.sequential {
            policy = sequential_policy(policy)?;
        }

        let mut options = config.run_options();
        options.verbose = verbose;
        if let Some(ms) = self.timeout.filter(|ms| *ms > 0) {
            options.timeout = Some(Duration::from_millis(ms));
        }

        tracing::debug!(
            hooks = config.hooks.len(),
            sequential = self.sequential,
            "Running configured hooks"
        );
        let pipeline = Pipeline::builder().policy(policy).options(options).build();
        let report = pipeline
            .run(&config.hooks, &payload)
            .context("Failed to run hooks")?;
        let stats = performance_stats(&report);

        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "report": report,
                    "stats": stats,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => print_summary(&report, &stats),
        }

        Ok(exit_code(&report))
    }
}

/// Map a report to the hook exit code contract
#[must_use]
pub fn exit_code(report: &AggregateReport) -> i32 {
    if report.blocked {
        EXIT_BLOCKED
    } else if report.success {
        EXIT_SUCCESS
    } else {
        EXIT_FAILED
    }
}

/// Read the payload from a file, from stdin, or default to `null`
pub fn read_payload(source: Option<&Path>) -> Result<Payload> {
    let content = match source {
        Some(path) if path.as_os_str() == "-" => read_stdin()?,
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {}", path.display()))?,
        None if std::io::stdin().is_terminal() => String::new(),
        None => read_stdin()?,
    };
    parse_payload(&content)
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read payload from stdin")?;
    Ok(content)
}

/// Parse payload text; blank input is `null`
pub fn parse_payload(content: &str) -> Result<Payload> {
    if content.trim().is_empty() {
        return Ok(Payload::null());
    }
    let value: Value = serde_json::from_str(content).context("Payload is not valid JSON")?;
    Ok(Payload::new(value))
}

fn sequential_policy(policy: SchedulerPolicy) -> Result<SchedulerPolicy> {
    let mut tiers = policy.tiers.clone();
    for (priority, spec) in policy.tiers.iter() {
        tiers = tiers.with_tier(priority, TierSpec::new(spec.default_timeout, 1))?;
    }
    Ok(SchedulerPolicy::new(tiers, policy.families))
}

fn print_summary(report: &AggregateReport, stats: &PerformanceStats) {
    for result in &report.blocks {
        println!("{} {}", "✗ blocked".red().bold(), describe(result));
        print_output(result);
    }
    for result in &report.errors {
        println!("{} {}", "✗ failed ".yellow().bold(), describe(result));
        if let Some(error) = &result.error {
            println!("    {}", error.dimmed());
        }
        print_output(result);
    }
    for result in &report.successful {
        println!("{} {}", "✓ passed ".green(), describe(result));
    }
    for skipped in &report.skipped {
        println!(
            "{} {} [{}] ({})",
            "- skipped".dimmed(),
            skipped.hook,
            skipped.priority,
            skipped.reason.dimmed()
        );
    }

    println!();
    if let Some(tier) = report.halted_at {
        println!("Pipeline halted at tier {}", tier.to_string().bold());
    }
    println!(
        "{} hooks, {} passed, {} blocked, {} failed, {} skipped",
        report.total_hooks,
        report.successful.len().green(),
        report.blocks.len().red(),
        report.errors.len().yellow(),
        report.skipped.len()
    );
    println!(
        "Total {}ms, longest {}ms, parallel efficiency {}, success rate {}",
        report.total_duration,
        report.max_duration.unwrap_or_default(),
        report.parallel_efficiency,
        stats.success_rate
    );
}

fn describe(result: &ExecutionResult) -> String {
    format!(
        "{} [{}/{}] {}ms",
        result.hook.bold(),
        result.priority,
        result.family,
        result.duration
    )
}

fn print_output(result: &ExecutionResult) {
    if let Some(output) = &result.output {
        for line in output.lines() {
            println!("    {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookgate_core::{ExecutionStrategy, Priority};
    use hookgate_engine::merge;
    use serde_json::json;

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload("").unwrap(), Payload::null());
        assert_eq!(parse_payload("  \n").unwrap(), Payload::null());
        assert_eq!(
            parse_payload(r#"{"tool": "Edit"}"#).unwrap().value(),
            &json!({"tool": "Edit"})
        );
        assert!(parse_payload("{nope").is_err());
    }

    #[test]
    fn test_read_payload_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[1, 2]").unwrap();
        let payload = read_payload(Some(temp.path())).unwrap();
        assert_eq!(payload.value(), &json!([1, 2]));

        assert!(read_payload(Some(Path::new("/nonexistent/payload.json"))).is_err());
    }

    #[test]
    fn test_exit_code_contract() {
        assert_eq!(exit_code(&merge(Vec::new())), EXIT_SUCCESS);

        let mut report = merge(Vec::new());
        report.success = false;
        assert_eq!(exit_code(&report), EXIT_FAILED);

        report.blocked = true;
        assert_eq!(exit_code(&report), EXIT_BLOCKED);
    }

    #[test]
    fn test_sequential_policy_keeps_timeouts() {
        let policy = sequential_policy(SchedulerPolicy::default()).unwrap();
        for (priority, spec) in policy.tiers.iter() {
            assert_eq!(spec.max_concurrency, 1, "{priority}");
            assert_eq!(spec.strategy, ExecutionStrategy::Sequential);
        }
        assert_eq!(
            policy.tiers.get(Priority::Low).default_timeout,
            Duration::from_millis(30_000)
        );
    }
}
