//! Logging configuration for the hookgate CLI
//!
//! Terminal output goes to stderr so that stdout stays free for reports.
//! An optional log file receives everything at debug level.

use crate::Result;
use hookgate_core::Error;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for the hookgate crates at the given level
fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("hookgate={level},hookgate_engine={level},hookgate_config={level}")
}

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging
/// * `log_file` - Optional path to append logs to
///
/// `RUST_LOG` overrides the terminal filter.
///
/// # Examples
/// ```ignore
/// // Warnings only
/// init(false, None)?;
///
/// // Verbose mode, also written to a file
/// init(true, Some(Path::new("hookgate.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .map_err(|e| Error::Config(format!("Invalid log filter: {e}")))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(verbose)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    // Timestamps only matter when following a verbose run
    let stderr_layer = if verbose {
        stderr_layer.with_filter(env_filter).boxed()
    } else {
        stderr_layer.without_time().with_filter(env_filter).boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            let file_filter = EnvFilter::try_new(default_directive(true))
                .map_err(|e| Error::Config(format!("Invalid log filter: {e}")))?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Message(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}
