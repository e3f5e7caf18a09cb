//! Per-hook execution results
//!
//! Exit code contract: `0` is success, `2` is a policy violation ("block"),
//! anything else is a hook execution error.

use crate::error::HookError;
use crate::hook::ClassifiedHook;
use crate::millis::as_millis;
use crate::tier::TierLabel;
use serde::Serialize;
use std::time::Duration;

/// Exit code a hook uses to report a policy violation
pub const BLOCK_EXIT_CODE: i32 = 2;

/// Failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Descriptor is unusable (no command); never executed
    Configuration,
    /// Command could not be started
    Spawn,
    /// Deadline exceeded
    Timeout,
    /// Non-zero, non-block exit or abnormal termination
    Execution,
}

/// The mutually exclusive outcome of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Exit code 0
    Success,
    /// Exit code 2
    Blocked,
    /// Anything else
    Failed,
}

/// Outcome of one executed hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Hook label
    pub hook: String,

    /// Exit code, absent if the hook never produced one
    pub exit_code: Option<i32>,

    /// Exit code was the reserved block code
    pub blocked: bool,

    /// Hook could not be classified as success or blocked
    pub failed: bool,

    /// Failure detail when `failed` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Failure category when `failed` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    /// Wall-clock milliseconds; 0 for hooks that never ran
    pub duration: u64,

    /// Tier, copied from the descriptor
    pub priority: TierLabel,

    /// Family, copied from the descriptor
    pub family: String,

    /// Captured output of the invocation, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ExecutionResult {
    fn base(hook: &ClassifiedHook, elapsed: Duration, output: Option<String>) -> Self {
        Self {
            hook: hook.label.clone(),
            exit_code: None,
            blocked: false,
            failed: false,
            error: None,
            failure: None,
            duration: as_millis(elapsed),
            priority: hook.priority.clone(),
            family: hook.family.clone(),
            output,
        }
    }

    /// Classify a completed invocation by its exit code
    #[must_use]
    pub fn from_exit_code(
        hook: &ClassifiedHook,
        code: i32,
        elapsed: Duration,
        output: Option<String>,
    ) -> Self {
        let mut result = Self::base(hook, elapsed, output);
        result.exit_code = Some(code);
        match code {
            0 => {}
            BLOCK_EXIT_CODE => result.blocked = true,
            _ => {
                let err = HookError::NonZeroExit { code };
                result.failed = true;
                result.failure = Some(err.kind());
                result.error = Some(err.to_string());
            }
        }
        result
    }

    /// Record a hook-level failure
    #[must_use]
    pub fn from_error(
        hook: &ClassifiedHook,
        error: &HookError,
        elapsed: Duration,
        output: Option<String>,
    ) -> Self {
        let mut result = Self::base(hook, elapsed, output);
        if let HookError::NonZeroExit { code } = error {
            result.exit_code = Some(*code);
        }
        result.failed = true;
        result.failure = Some(error.kind());
        result.error = Some(error.to_string());
        result
    }

    /// Which of success / blocked / failed this result is
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.blocked {
            Outcome::Blocked
        } else if self.failed {
            Outcome::Failed
        } else {
            Outcome::Success
        }
    }

    /// Neither blocked nor failed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome() == Outcome::Success
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::family::BlockingBehavior;
    use crate::tier::Priority;

    fn hook() -> ClassifiedHook {
        ClassifiedHook {
            label: "check".to_string(),
            command: Some("check".to_string()),
            priority: TierLabel::Known(Priority::High),
            family: "testing".to_string(),
            timeout: Duration::from_millis(100),
            blocking_behavior: BlockingBehavior::SoftBlock,
        }
    }

    #[test]
    fn test_exit_zero_is_success() {
        let result = ExecutionResult::from_exit_code(&hook(), 0, Duration::from_millis(12), None);
        assert_eq!(result.outcome(), Outcome::Success);
        assert!(!result.blocked && !result.failed);
        assert_eq!(result.duration, 12);
        assert_eq!(result.family, "testing");
        assert_eq!(result.priority.as_str(), "high");
    }

    #[test]
    fn test_exit_two_is_blocked_not_failed() {
        let result = ExecutionResult::from_exit_code(&hook(), 2, Duration::ZERO, None);
        assert!(result.blocked);
        assert!(!result.failed);
        assert!(result.error.is_none());
        assert_eq!(result.outcome(), Outcome::Blocked);
    }

    #[test]
    fn test_other_exit_codes_fail() {
        for code in [1, 3, 127, -1] {
            let result = ExecutionResult::from_exit_code(&hook(), code, Duration::ZERO, None);
            assert!(result.failed, "exit code {code} should fail");
            assert!(!result.blocked);
            assert_eq!(result.failure, Some(FailureKind::Execution));
            assert_eq!(result.exit_code, Some(code));
        }
    }

    #[test]
    fn test_from_error_has_no_exit_code() {
        let result = ExecutionResult::from_error(
            &hook(),
            &HookError::TimedOut { timeout_ms: 100 },
            Duration::from_millis(101),
            None,
        );
        assert!(result.failed);
        assert_eq!(result.exit_code, None);
        assert_eq!(result.failure, Some(FailureKind::Timeout));
        assert!(result.error.unwrap().contains("timed out"));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let result = ExecutionResult::from_exit_code(&hook(), 2, Duration::from_millis(5), None);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["exitCode"], 2);
        assert_eq!(json["blocked"], true);
        assert_eq!(json["priority"], "high");
        assert!(json.get("error").is_none());
    }
}
