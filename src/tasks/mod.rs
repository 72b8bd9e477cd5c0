//! Named, strictly ordered tasks that drive the engine primitives.
//!
//! Tasks run sequentially. Soft failures (missing anchors, unreachable
//! update remote) are handled inside a task and surface as warnings; an
//! error returned from [`Task::run`] is fatal and stops the run immediately,
//! leaving already completed tasks in place (steps are not transactional).
pub mod context;
pub mod mirror;
pub mod patches;
pub mod update;
pub mod version_check;

pub use context::Context;

use anyhow::Result;

use crate::config::hosts::Host;
use crate::logging::{Log as _, TaskStatus};

/// Result of a task that completed without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task decided there was nothing for it to do.
    Skipped(String),
    /// Task previewed its changes (dry-run mode).
    DryRun,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current run at all.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions (missing required host,
    /// missing add-on source tree, declined confirmation, I/O failure);
    /// recoverable problems are logged and folded into the [`TaskResult`].
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The ordered task list for the install command.
#[must_use]
pub fn install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(update::SyncSetupRepo),
        Box::new(version_check::CheckHostVersions),
        Box::new(mirror::DeployModules::new(Host::Klippy)),
        Box::new(patches::ApplyHostPatches::new(Host::Klippy)),
        Box::new(mirror::DeployModules::new(Host::Screen)),
        Box::new(patches::ApplyHostPatches::new(Host::Screen)),
    ]
}

/// The ordered task list for the uninstall command.
///
/// Patches come out before the mirrors so a host is never left referencing
/// modules that are already gone.
#[must_use]
pub fn uninstall_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(update::SyncSetupRepo),
        Box::new(patches::RemoveHostPatches::new(Host::Screen)),
        Box::new(mirror::RemoveModules::new(Host::Screen)),
        Box::new(patches::RemoveHostPatches::new(Host::Klippy)),
        Box::new(mirror::RemoveModules::new(Host::Klippy)),
    ]
}

/// Execute a task and record its outcome for the summary.
///
/// # Errors
///
/// Propagates the task's error after recording it, so the caller aborts the
/// remainder of the run.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    let name = task.name();
    if !task.should_run(ctx) {
        ctx.log.debug(&format!("{name}: not applicable to this run"));
        ctx.log.record_task(name, TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(name);
    let outcome = task.run(ctx);
    match &outcome {
        Ok(TaskResult::Ok) => ctx.log.record_task(name, TaskStatus::Ok, None),
        Ok(TaskResult::DryRun) => ctx.log.record_task(name, TaskStatus::DryRun, None),
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log.record_task(name, TaskStatus::Skipped, Some(reason));
        }
        Err(e) => {
            ctx.log.error(&format!("{name}: {e:#}"));
            ctx.log
                .record_task(name, TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
    outcome.map(|_| ())
}
