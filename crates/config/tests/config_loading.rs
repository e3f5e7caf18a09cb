//! Integration tests for loading config files from disk

#![allow(clippy::unwrap_used, clippy::panic)]

use hookgate_config::{Config, Error};
use hookgate_core::{BlockingBehavior, Priority};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        temp.path(),
        "hookgate.toml",
        r#"
[options]
timeout = 20000
working_dir = "checks"

[options.env]
CI = "1"

[tiers.high]
timeout = 8000
max_concurrency = 4

[families]
docs = "none"

[[hooks]]
command = "scripts/check-secrets.sh"
priority = "critical"
family = "security"
timeout = 2000

[[hooks]]
command = "cargo fmt --check"
priority = "high"
family = "formatting"
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.hooks.len(), 2);
    assert_eq!(config.base_dir(), Some(temp.path()));

    let policy = config.policy().unwrap();
    assert_eq!(policy.tiers.get(Priority::High).max_concurrency, 4);
    assert_eq!(policy.families.resolve("docs"), BlockingBehavior::None);

    let options = config.run_options();
    assert_eq!(options.timeout, Some(Duration::from_millis(20_000)));
    assert_eq!(options.working_dir, Some(temp.path().join("checks")));
}

#[test]
fn test_load_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(temp.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn test_load_malformed_file() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), "bad.toml", "[[hooks]]\ntimeout = \"soon\"\n");
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"), "{err}");
}

#[test]
fn test_discover_prefers_local_file() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "hookgate.toml",
        "[[hooks]]\ncommand = \"true\"\n",
    );

    let config = Config::discover(None, temp.path()).unwrap();
    assert_eq!(config.hooks.len(), 1);
}

#[test]
fn test_discover_explicit_path() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "hookgate.toml", "[[hooks]]\ncommand = \"local\"\n");
    let explicit = write_config(
        temp.path(),
        "other.toml",
        "[[hooks]]\ncommand = \"a\"\n[[hooks]]\ncommand = \"b\"\n",
    );

    let config = Config::discover(Some(&explicit), temp.path()).unwrap();
    assert_eq!(config.hooks.len(), 2);
}
