//! Task bookkeeping shared between the logger and the task runner.

/// How a finished task is reported in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Completed successfully.
    Ok,
    /// Does not apply to this run (e.g., host not installed).
    NotApplicable,
    /// Explicitly skipped (e.g., remote unreachable, nothing to do).
    Skipped,
    /// Previewed only; no changes were applied.
    DryRun,
    /// Hit an error and could not complete.
    Failed,
}

impl TaskStatus {
    /// Marker shown in the summary column.
    pub(super) const fn glyph(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::NotApplicable => "-",
            Self::Skipped => "»",
            Self::DryRun => "·",
            Self::Failed => "✗",
        }
    }

    /// ANSI style applied to the summary line.
    pub(super) const fn tint(self) -> &'static str {
        match self {
            Self::Ok => "\x1b[32m",
            Self::NotApplicable => "\x1b[2m",
            Self::Skipped => "\x1b[33m",
            Self::DryRun => "\x1b[36m",
            Self::Failed => "\x1b[31m",
        }
    }

    /// Label used in the summary tally.
    pub(super) const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }
}

/// One row of the end-of-run summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable task name.
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Skip reason or error description, when there is one.
    pub message: Option<String>,
}

/// Logging interface handed to tasks.
///
/// Production code uses [`Logger`](super::Logger), which forwards to the
/// global tracing subscriber; tests can substitute a silent or recording
/// implementation.
pub trait Log: Send + Sync {
    /// A stage header (major section of the run).
    fn stage(&self, msg: &str);
    /// An informational message.
    fn info(&self, msg: &str);
    /// A debug message (console only when verbose; always in the log file).
    fn debug(&self, msg: &str);
    /// A warning.
    fn warn(&self, msg: &str);
    /// An error.
    fn error(&self, msg: &str);
    /// A preview line emitted instead of acting, in dry-run mode.
    fn dry_run(&self, msg: &str);
    /// Record a task result for the end-of-run summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
