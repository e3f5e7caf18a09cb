//! Policy command
//!
//! Prints the tier table and family policy after config overrides.

use anyhow::{Context, Result};
use clap::Args;
use hookgate_config::Config;
use hookgate_core::{ExecutionStrategy, SchedulerPolicy};
use owo_colors::OwoColorize;

use crate::OutputFormat;

/// Show the effective scheduling policy
#[derive(Debug, Args)]
pub struct PolicyCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl PolicyCommand {
    /// Print the policy
    pub fn execute(&self, config: &Config) -> Result<()> {
        let policy = config.policy().context("Invalid tier or family configuration")?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&policy)?),
            OutputFormat::Text => print_policy(&policy),
        }

        Ok(())
    }
}

fn print_policy(policy: &SchedulerPolicy) {
    println!("{}", "Tiers:".bold());
    for (priority, spec) in policy.tiers.iter() {
        let strategy = match spec.strategy {
            ExecutionStrategy::Sequential => "sequential".to_string(),
            ExecutionStrategy::Parallel => format!("parallel, up to {}", spec.max_concurrency),
        };
        println!(
            "  {}. {} timeout {}ms, {}",
            priority.rank(),
            format!("{:<10}", priority.name()).cyan(),
            hookgate_core::millis::as_millis(spec.default_timeout),
            strategy
        );
    }

    println!("\n{}", "Families:".bold());
    for (family, behavior) in policy.families.iter() {
        println!("  {family:<14} {behavior}");
    }
    println!("  {:<14} {}", "(other)".dimmed(), policy.families.fallback());
}
