//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::logging::Logger;
use crate::prompt::ConsolePrompter;
use crate::tasks;

use super::RunOutcome;

/// Run the uninstall command.
///
/// Removal is anchor-safe on any host revision, so there is no version gate:
/// absent hosts simply have nothing to remove.
///
/// # Errors
///
/// Returns an error if path resolution fails or a removal step hits an I/O
/// failure.
pub fn run(global: &GlobalOpts, _opts: &UninstallOpts, log: &Arc<Logger>) -> Result<RunOutcome> {
    let ctx = super::setup_context(global, log, Arc::new(ConsolePrompter))?;
    super::run_tasks(&tasks::uninstall_tasks(), &ctx, log)
}
