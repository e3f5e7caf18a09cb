//! Task abstraction
//!
//! The scheduler never spawns anything itself: it asks a [`TaskResolver`] for
//! a [`Task`] matching a hook's command and runs it against a deadline.
//!
//! Two implementations are provided:
//!
//! - [`CommandTask`]: an external process, payload on stdin, killed when the
//!   deadline expires
//! - [`InProcessTask`]: a function executed on its own thread and raced
//!   against the deadline

use hookgate_core::{ClassifiedHook, HookError, Payload};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

/// Maximum number of captured output bytes kept per invocation
const MAX_CAPTURED_OUTPUT: usize = 4096;

/// How an invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The invocation exited with a code
    Exited {
        /// Exit code
        code: i32,
        /// Captured output, if any
        output: Option<String>,
    },
    /// The invocation ended without an exit code
    Terminated(String),
    /// The invocation could not be started
    SpawnFailed(String),
    /// The deadline expired first; the invocation was cancelled
    TimedOut,
}

/// Something that can be executed for a hook
pub trait Task: Send + Sync {
    /// Run against `payload`, giving up after `deadline`
    fn execute(&self, payload: &Payload, deadline: Duration) -> TaskOutcome;
}

/// Maps a hook command to a [`Task`]
pub trait TaskResolver: Send + Sync {
    /// Resolve `command` (never blank) for `hook`
    fn resolve(&self, command: &str, hook: &ClassifiedHook) -> Result<Arc<dyn Task>, HookError>;
}

/// Implement `TaskResolver` for closures
impl<F> TaskResolver for F
where
    F: Fn(&str, &ClassifiedHook) -> Result<Arc<dyn Task>, HookError> + Send + Sync,
{
    fn resolve(&self, command: &str, hook: &ClassifiedHook) -> Result<Arc<dyn Task>, HookError> {
        self(command, hook)
    }
}

// ======================================================================
// External commands
// ======================================================================

/// Resolves commands to external processes
///
/// Commands are split with shell-words (`scan --path "my dir"` becomes
/// `["scan", "--path", "my dir"]`) and executed directly, without a shell.
#[derive(Debug, Clone, Default)]
pub struct CommandResolver {
    env: Arc<IndexMap<String, String>>,
    working_dir: Option<PathBuf>,
}

impl CommandResolver {
    /// Create a resolver with no extra environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra environment variables passed to every hook
    #[must_use]
    pub fn env_vars(mut self, vars: IndexMap<String, String>) -> Self {
        Arc::make_mut(&mut self.env).extend(vars);
        self
    }

    /// Working directory of every hook
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl TaskResolver for CommandResolver {
    fn resolve(&self, command: &str, hook: &ClassifiedHook) -> Result<Arc<dyn Task>, HookError> {
        let parts = shell_words::split(command).map_err(|e| HookError::InvalidCommand {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

        let Some((program, args)) = parts.split_first() else {
            return Err(HookError::InvalidCommand {
                command: command.to_string(),
                reason: "empty command".to_string(),
            });
        };

        let mut env = (*self.env).clone();
        env.insert("HOOKGATE_HOOK".to_string(), hook.label.clone());
        env.insert("HOOKGATE_PRIORITY".to_string(), hook.priority.to_string());
        env.insert("HOOKGATE_FAMILY".to_string(), hook.family.clone());

        Ok(Arc::new(CommandTask {
            program: program.clone(),
            args: args.to_vec(),
            env,
            working_dir: self.working_dir.clone(),
        }))
    }
}

/// An external process receiving the payload as JSON on stdin
#[derive(Debug, Clone)]
pub struct CommandTask {
    program: String,
    args: Vec<String>,
    env: IndexMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl Task for CommandTask {
    #[tracing::instrument(skip(self, payload), fields(program = %self.program))]
    fn execute(&self, payload: &Payload, deadline: Duration) -> TaskOutcome {
        let stdin = match payload.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => return TaskOutcome::SpawnFailed(format!("Failed to serialize payload: {e}")),
        };

        // Non-zero exits are classified by the caller, not treated as errors
        let mut expr = duct::cmd(&self.program, &self.args)
            .stdin_bytes(stdin)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked();

        if let Some(dir) = &self.working_dir {
            expr = expr.dir(dir);
        }
        for (key, value) in &self.env {
            expr = expr.env(key, value);
        }

        let handle = match expr.start() {
            Ok(handle) => handle,
            Err(e) => return TaskOutcome::SpawnFailed(e.to_string()),
        };

        match handle.wait_timeout(deadline) {
            Ok(Some(output)) => match output.status.code() {
                Some(code) => TaskOutcome::Exited {
                    code,
                    output: capture_output(&output.stdout),
                },
                None => TaskOutcome::Terminated(format!("{} ({})", self.program, output.status)),
            },
            Ok(None) => {
                if let Err(e) = handle.kill() {
                    tracing::warn!(error = %e, "Failed to kill timed out process");
                }
                TaskOutcome::TimedOut
            }
            Err(e) => TaskOutcome::Terminated(e.to_string()),
        }
    }
}

/// Keep the tail of the captured output, trimmed; `None` when empty
fn capture_output(bytes: &[u8]) -> Option<String> {
    let start = bytes.len().saturating_sub(MAX_CAPTURED_OUTPUT);
    let text = String::from_utf8_lossy(&bytes[start..]);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ======================================================================
// In-process tasks
// ======================================================================

/// Cooperative cancellation flag handed to in-process tasks
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the deadline has expired
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Signal cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

type TaskFn = dyn Fn(&Payload, &CancelToken) -> i32 + Send + Sync;

/// A function returning an exit code, run on a dedicated thread
///
/// When the deadline wins the race the token is cancelled and the thread is
/// left to observe it; its late result is discarded.
#[derive(Clone)]
pub struct InProcessTask {
    func: Arc<TaskFn>,
}

impl InProcessTask {
    /// Wrap a function
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Payload, &CancelToken) -> i32 + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for InProcessTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessTask").finish_non_exhaustive()
    }
}

impl Task for InProcessTask {
    fn execute(&self, payload: &Payload, deadline: Duration) -> TaskOutcome {
        let (tx, rx) = mpsc::channel();
        let token = CancelToken::new();

        let func = Arc::clone(&self.func);
        let payload = payload.clone();
        let worker_token = token.clone();
        let spawned = std::thread::Builder::new()
            .name("hookgate-task".to_string())
            .spawn(move || {
                let code = func(&payload, &worker_token);
                // Receiver is gone once the deadline has passed
                let _ = tx.send(code);
            });

        if let Err(e) = spawned {
            return TaskOutcome::SpawnFailed(e.to_string());
        }

        match rx.recv_timeout(deadline) {
            Ok(code) => TaskOutcome::Exited { code, output: None },
            Err(mpsc::RecvTimeoutError::Timeout) => {
                token.cancel();
                TaskOutcome::TimedOut
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                TaskOutcome::Terminated("in-process task panicked".to_string())
            }
        }
    }
}

// ======================================================================
// Registry
// ======================================================================

/// Resolves commands to registered tasks by exact name
///
/// Unregistered commands go to the fallback resolver when one is set, and
/// are reported as spawn failures otherwise.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<dyn Task>>,
    fallback: Option<Arc<dyn TaskResolver>>,
}

impl TaskRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under a command name
    #[must_use]
    pub fn register(mut self, command: impl Into<String>, task: impl Task + 'static) -> Self {
        self.tasks.insert(command.into(), Arc::new(task));
        self
    }

    /// Resolver used for commands that are not registered
    #[must_use]
    pub fn fallback(mut self, resolver: impl TaskResolver + 'static) -> Self {
        self.fallback = Some(Arc::new(resolver));
        self
    }
}

impl TaskResolver for TaskRegistry {
    fn resolve(&self, command: &str, hook: &ClassifiedHook) -> Result<Arc<dyn Task>, HookError> {
        if let Some(task) = self.tasks.get(command) {
            return Ok(Arc::clone(task));
        }
        match &self.fallback {
            Some(resolver) => resolver.resolve(command, hook),
            None => Err(HookError::Spawn {
                command: command.to_string(),
                reason: "no task registered under this name".to_string(),
            }),
        }
    }
}
