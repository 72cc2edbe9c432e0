//! Structured logging with dry-run awareness and summary collection.
//!
//! Console output is routed through [`tracing`]; the [`Logger`] additionally
//! records per-operation results so commands can print an end-of-run summary.
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Operation execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable operation name.
    pub name: String,
    /// Final status of the operation.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Operation completed successfully.
    Ok,
    /// Operation was skipped (e.g., incompatible host, missing source).
    Skipped,
    /// Operation ran in dry-run mode; no changes were applied.
    DryRun,
    /// Operation encountered an error and could not complete.
    Failed,
}

impl TaskStatus {
    /// Short label used in the printed summary.
    const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "FAILED",
        }
    }
}

/// Install the global tracing subscriber for console output.
///
/// Honors `DOTCTL_LOG` for fine-grained filtering; the `verbose` flag raises
/// the default level from `info` to `debug`. Safe to call once per process;
/// subsequent calls are no-ops.
pub fn init_subscriber(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("DOTCTL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Structured logger with dry-run awareness and summary collection.
#[derive(Debug)]
pub struct Logger {
    verbose: bool,
    tasks: Mutex<Vec<TaskEntry>>,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Whether verbose output was requested.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "dotctl::stage", "==> {msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "dotctl::dry_run", "[dry-run] {msg}");
    }

    /// Record an operation result for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return `true` if any recorded operation has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the number of failed operations.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Print the summary of all recorded operations.
    pub fn print_summary(&self) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in &tasks {
            match &entry.message {
                Some(message) => self.info(&format!(
                    "{:<10} {} ({message})",
                    entry.status.label(),
                    entry.name
                )),
                None => self.info(&format!("{:<10} {}", entry.status.label(), entry.name)),
            }
        }
    }
}
