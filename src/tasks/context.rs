use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::config::hosts::Host;
use crate::logging::Log;
use crate::prompt::Prompter;

/// Everything a task is allowed to touch, passed explicitly.
///
/// There is no ambient global state: each task gets its paths, logger, and
/// prompter from here. The restart latch is the one piece of cross-task
/// communication, raised by the self-update task and read by the command
/// runner, which stops the run so the caller can re-exec.
pub struct Context {
    /// Resolved paths for this run.
    pub config: Config,
    /// Sink for output and task recording.
    pub log: Arc<dyn Log>,
    /// Source of answers to operator confirmations.
    pub prompter: Arc<dyn Prompter>,
    /// Preview mode: report intended changes, apply none.
    pub dry_run: bool,
    /// The self-update step was disabled on the command line.
    pub skip_update: bool,
    restart_requested: AtomicBool,
}

impl std::fmt::Debug for Context {
    // log and prompter are trait objects with nothing useful to print.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("dry_run", &self.dry_run)
            .field("skip_update", &self.skip_update)
            .field("restart_requested", &self.restart_requested)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Create a new context for task execution.
    #[must_use]
    pub fn new(
        config: Config,
        log: Arc<dyn Log>,
        prompter: Arc<dyn Prompter>,
        dry_run: bool,
        skip_update: bool,
    ) -> Self {
        Self {
            config,
            log,
            prompter,
            dry_run,
            skip_update,
            restart_requested: AtomicBool::new(false),
        }
    }

    /// Signal that the installer updated itself and the process should be
    /// re-executed before doing anything else.
    pub fn request_restart(&self) {
        self.restart_requested.store(true, Ordering::SeqCst);
    }

    /// Whether a restart has been requested by the self-update task.
    #[must_use]
    pub fn restart_requested(&self) -> bool {
        self.restart_requested.load(Ordering::SeqCst)
    }

    /// `true` when the named host's checkout directory exists.
    #[must_use]
    pub fn host_installed(&self, host: Host) -> bool {
        self.config.host_root(host).is_dir()
    }
}
