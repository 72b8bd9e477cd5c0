//! Install command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::{Log as _, Logger};
use crate::prompt::ConsolePrompter;
use crate::tasks;

use super::RunOutcome;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if path resolution fails, a required host is missing,
/// the add-on source tree is absent, or the operator declines a
/// confirmation.
pub fn run(global: &GlobalOpts, _opts: &InstallOpts, log: &Arc<Logger>) -> Result<RunOutcome> {
    let version = option_env!("MMS_SETUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("mms-setup {version}"));

    let ctx = super::setup_context(global, log, Arc::new(ConsolePrompter))?;
    let outcome = super::run_tasks(&tasks::install_tasks(), &ctx, log)?;
    if outcome == RunOutcome::Done && !ctx.dry_run {
        log.info("restart the klipper and KlipperScreen services to load the add-on");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use crate::tasks;

    #[test]
    fn install_tasks_start_with_self_update() {
        let tasks = tasks::install_tasks();
        assert_eq!(tasks[0].name(), "Sync installer repository");
    }

    #[test]
    fn install_tasks_gate_before_deploying() {
        let tasks = tasks::install_tasks();
        let names: Vec<&str> = tasks.iter().map(|t| t.name()).collect();
        let gate = names.iter().position(|n| *n == "Check host versions");
        let deploy = names.iter().position(|n| *n == "Deploy Klipper modules");
        assert!(gate < deploy);
    }

    #[test]
    fn install_tasks_have_unique_names() {
        let tasks = tasks::install_tasks();
        let names: Vec<&str> = tasks.iter().map(|t| t.name()).collect();
        let unique: std::collections::HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len(), "duplicate task names: {names:?}");
    }
}
