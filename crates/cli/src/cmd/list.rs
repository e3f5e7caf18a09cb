//! List command
//!
//! Shows how the configured hooks are classified, grouped by tier in
//! execution order.

use anyhow::{Context, Result};
use clap::Args;
use hookgate_config::Config;
use hookgate_core::TierLabel;
use hookgate_engine::{Classifier, Pipeline, TierGroups};
use owo_colors::OwoColorize;

use crate::OutputFormat;

/// List configured hooks
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ListCommand {
    /// Print the classified hooks
    pub fn execute(&self, config: &Config) -> Result<()> {
        let policy = config.policy().context("Invalid tier or family configuration")?;
        let pipeline = Pipeline::builder()
            .policy(policy)
            .options(config.run_options())
            .build();

        let classified = pipeline.classifier().classify(&config.hooks);
        let groups = Classifier::group_by_priority(&classified);

        match self.format {
            OutputFormat::Json => {
                let json: serde_json::Map<String, serde_json::Value> = groups
                    .iter()
                    .map(|(label, hooks)| {
                        serde_json::to_value(hooks).map(|v| (label.to_string(), v))
                    })
                    .collect::<serde_json::Result<_>>()?;
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => print_groups(&groups),
        }

        Ok(())
    }
}

fn print_groups(groups: &TierGroups) {
    if groups.values().all(Vec::is_empty) {
        println!("{}", "No hooks configured.".yellow());
        return;
    }

    for (label, hooks) in groups {
        if hooks.is_empty() {
            continue;
        }

        match label {
            TierLabel::Known(_) => println!("{} ({} hooks)", label.bold(), hooks.len()),
            TierLabel::Unknown(_) => println!(
                "{} ({} hooks) {}",
                label.dimmed(),
                hooks.len(),
                "[unrecognized priority, will not run]".dimmed()
            ),
        }

        for hook in hooks {
            println!(
                "  • {} (family: {}, {}, timeout: {}ms)",
                hook.label.green(),
                hook.family,
                hook.blocking_behavior,
                hookgate_core::millis::as_millis(hook.timeout)
            );
        }
    }
}
