//! Top-level command orchestration.
pub mod install;
pub mod uninstall;

use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::{Log as _, Logger};
use crate::prompt::Prompter;
use crate::tasks::{self, Context, Task};

/// What the process should do after a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run finished; exit normally.
    Done,
    /// The installer updated itself; re-execute with the original arguments.
    Restart,
}

/// Build the execution context shared by the install and uninstall commands.
///
/// # Errors
///
/// Returns an error if the add-on source root or host paths cannot be
/// resolved.
pub fn setup_context(
    global: &GlobalOpts,
    log: &Arc<Logger>,
    prompter: Arc<dyn Prompter>,
) -> Result<Context> {
    let config = Config::resolve(global)?;
    log.debug(&format!("source root: {}", config.source_root.display()));
    log.debug(&format!("klipper: {}", config.klipper_root.display()));
    log.debug(&format!("klipperscreen: {}", config.screen_root.display()));

    Ok(Context::new(
        config,
        Arc::clone(log) as Arc<dyn crate::logging::Log>,
        prompter,
        global.dry_run,
        global.skip_update,
    ))
}

/// Execute tasks in order, stopping at the first fatal error or at a restart
/// request, and print the run summary.
///
/// # Errors
///
/// Propagates the first task error after printing the summary; the exit is
/// then non-zero and completed steps stay as they are.
pub fn run_tasks(tasks: &[Box<dyn Task>], ctx: &Context, log: &Logger) -> Result<RunOutcome> {
    for task in tasks {
        if let Err(e) = tasks::execute(task.as_ref(), ctx) {
            log.print_summary();
            return Err(e);
        }
        if ctx.restart_requested() {
            return Ok(RunOutcome::Restart);
        }
    }
    log.print_summary();
    Ok(RunOutcome::Done)
}
