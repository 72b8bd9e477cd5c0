//! Deploy and retract the symlink mirrors.

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::config::hosts::Host;
use crate::logging::Log as _;
use crate::resources::link_tree;

/// Mirror the add-on subtree into a host's module directory.
pub struct DeployModules {
    host: Host,
}

impl DeployModules {
    /// Deployment task for `host`.
    #[must_use]
    pub const fn new(host: Host) -> Self {
        Self { host }
    }
}

impl Task for DeployModules {
    fn name(&self) -> &str {
        match self.host {
            Host::Klippy => "Deploy Klipper modules",
            Host::Screen => "Deploy KlipperScreen modules",
        }
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.host_installed(self.host)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let spec = self.host.spec();
        let stats = link_tree::deploy(
            &ctx.config.source_subtree(self.host),
            &ctx.config.module_dir(self.host),
            spec.extensions,
            ctx.dry_run,
            ctx.log.as_ref(),
        )?;

        if ctx.dry_run {
            ctx.log.info(&format!("{} links would change", stats.linked));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info(&format!(
            "{} linked, {} already ok, {} skipped",
            stats.linked, stats.already_ok, stats.skipped
        ));
        Ok(TaskResult::Ok)
    }
}

/// Delete a host's mirrored module directory.
pub struct RemoveModules {
    host: Host,
}

impl RemoveModules {
    /// Removal task for `host`.
    #[must_use]
    pub const fn new(host: Host) -> Self {
        Self { host }
    }
}

impl Task for RemoveModules {
    fn name(&self) -> &str {
        match self.host {
            Host::Klippy => "Remove Klipper modules",
            Host::Screen => "Remove KlipperScreen modules",
        }
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.host_installed(self.host)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let module_dir = ctx.config.module_dir(self.host);
        let removed = link_tree::remove(&module_dir, ctx.dry_run, ctx.log.as_ref())?;
        if !removed {
            return Ok(TaskResult::Skipped("mirror not present".to_string()));
        }
        if ctx.dry_run {
            return Ok(TaskResult::DryRun);
        }
        ctx.log.info(&format!("removed {}", module_dir.display()));
        Ok(TaskResult::Ok)
    }
}
