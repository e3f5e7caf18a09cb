//! Hookgate CLI library
//!
//! This library contains the CLI logic for hookgate, making it reusable
//! for testing and integration with other tools.
//!
//! The process exit status follows the same contract as the hooks it runs:
//! `0` when every hook passed, `2` when a hook blocked, `1` otherwise. This
//! lets `hookgate run` itself be registered as a hook.

pub mod cmd;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use hookgate_config::Config;

/// Exit status when every hook passed
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status when a hook failed or hookgate itself errored
pub const EXIT_FAILED: i32 = 1;
/// Exit status when a hook blocked
pub const EXIT_BLOCKED: i32 = hookgate_core::BLOCK_EXIT_CODE;

/// Hookgate - tiered, parallel validation hook scheduler
#[derive(Parser)]
#[command(name = "hookgate")]
#[command(about = "Run validation hooks in priority tiers")]
#[command(version)]
#[command(long_about = "Run validation hooks in priority tiers

Hooks are grouped into five tiers (critical, high, medium, low, background)
that run strictly in order. Hooks within a tier run in parallel up to the
tier's concurrency cap. Every hook receives the same JSON payload on stdin.

Hook exit codes:
  • 0  passed
  • 2  blocked (policy violation, stops later tiers)
  • *  failed")]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "HOOKGATE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, global = true, env = "HOOKGATE_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary
    #[default]
    Text,
    /// Machine readable JSON
    Json,
}

/// Available commands for hookgate CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured hooks against a payload
    Run(cmd::run::RunCommand),

    /// List configured hooks grouped by tier
    List(cmd::list::ListCommand),

    /// Show the effective tier table and family policy
    Policy(cmd::policy::PolicyCommand),
}

/// Main entry point for the CLI application
///
/// Returns the process exit status.
///
/// # Errors
///
/// Returns an error if logging, configuration or input handling fails
pub fn run(cli: Cli) -> Result<i32> {
    hookgate_config::logging::init(cli.verbose, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::discover(cli.config.as_deref(), &cwd).context("Failed to load config")?;

    match cli.command {
        Commands::Run(run_cmd) => run_cmd.execute(&config, cli.verbose),
        Commands::List(list_cmd) => list_cmd.execute(&config).map(|()| EXIT_SUCCESS),
        Commands::Policy(policy_cmd) => policy_cmd.execute(&config).map(|()| EXIT_SUCCESS),
    }
}
