//! Run logger: emits tracing events and keeps the task tally for the
//! end-of-run summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;

/// The installer's logger.
///
/// Display methods forward to tracing events; the console and file layers
/// installed by [`init_subscriber`](super::init_subscriber) decide how each
/// event is rendered. Task results accumulate here until
/// [`print_summary`](Self::print_summary).
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<TaskEntry>>,
    log_file: PathBuf,
}

impl Logger {
    /// A logger for the given command.
    ///
    /// Only remembers the install-log path for the summary footer; the file
    /// itself is opened by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// All recorded task entries, in execution order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Number of tasks recorded as failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.task_entries()
            .iter()
            .filter(|e| e.status == TaskStatus::Failed)
            .count()
    }

    /// `true` if any recorded task failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Print one line per recorded task, a tally, and the install-log path.
    ///
    /// Quiet when nothing was recorded (e.g., the `version` command).
    pub fn print_summary(&self) {
        let entries = self.task_entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in &entries {
            let note = entry
                .message
                .as_deref()
                .map_or_else(String::new, |m| format!(" ({m})"));
            self.info(&format!(
                "{}{} {}{note}\x1b[0m",
                entry.status.tint(),
                entry.status.glyph(),
                entry.name
            ));
        }

        let tally: Vec<String> = [
            TaskStatus::Ok,
            TaskStatus::Skipped,
            TaskStatus::DryRun,
            TaskStatus::NotApplicable,
            TaskStatus::Failed,
        ]
        .into_iter()
        .map(|status| {
            (
                status,
                entries.iter().filter(|e| e.status == status).count(),
            )
        })
        .filter(|&(_, n)| n > 0)
        .map(|(status, n)| format!("{n} {}", status.label()))
        .collect();
        self.info(&format!("{} tasks: {}", entries.len(), tally.join(", ")));

        if self.log_file.is_file() {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", self.log_file.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: "mms::stage", "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: "mms::dry_run", "{msg}");
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
