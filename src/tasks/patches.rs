//! Apply and reverse the host file patches.
//!
//! Patches are processed per target file as a batch (all of a file's patches
//! removed, then reapplied), so a partially patched file is never left
//! behind. A missing anchor or a missing target file is soft: the install
//! keeps going so the operator gets the fullest possible outcome in one
//! pass.

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::config::hosts::Host;
use crate::logging::Log as _;
use crate::resources::patch::{self, PatchOutcome, group_by_target};

/// Splice the add-on into a host's files.
pub struct ApplyHostPatches {
    host: Host,
}

impl ApplyHostPatches {
    /// Patch task for `host`.
    #[must_use]
    pub const fn new(host: Host) -> Self {
        Self { host }
    }
}

impl Task for ApplyHostPatches {
    fn name(&self) -> &str {
        match self.host {
            Host::Klippy => "Patch Klipper",
            Host::Screen => "Patch KlipperScreen",
        }
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.host_installed(self.host)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let log = ctx.log.as_ref();
        let root = ctx.config.host_root(self.host);
        let mut patched = 0u32;
        let mut already_ok = 0u32;

        for (target, group) in group_by_target(self.host.spec().patches) {
            let path = root.join(target);
            match patch::apply_file(&path, &group, ctx.dry_run, log)? {
                PatchOutcome::Edited => patched += 1,
                PatchOutcome::Unchanged => already_ok += 1,
                PatchOutcome::NoTarget => {
                    log.warn(&format!("patch target missing: {}", path.display()));
                }
            }
        }

        if ctx.dry_run {
            ctx.log.info(&format!("{patched} file(s) would change"));
            return Ok(TaskResult::DryRun);
        }

        ctx.log
            .info(&format!("{patched} patched, {already_ok} already ok"));
        Ok(TaskResult::Ok)
    }
}

/// Restore a host's files to their pre-patch content.
pub struct RemoveHostPatches {
    host: Host,
}

impl RemoveHostPatches {
    /// Unpatch task for `host`.
    #[must_use]
    pub const fn new(host: Host) -> Self {
        Self { host }
    }
}

impl Task for RemoveHostPatches {
    fn name(&self) -> &str {
        match self.host {
            Host::Klippy => "Unpatch Klipper",
            Host::Screen => "Unpatch KlipperScreen",
        }
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.host_installed(self.host)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let log = ctx.log.as_ref();
        let root = ctx.config.host_root(self.host);
        let mut restored = 0u32;

        for (target, group) in group_by_target(self.host.spec().patches) {
            let path = root.join(target);
            match patch::remove_file(&path, &group, ctx.dry_run, log)? {
                PatchOutcome::Edited => restored += 1,
                PatchOutcome::Unchanged => {}
                PatchOutcome::NoTarget => {
                    log.debug(&format!("patch target missing: {}", path.display()));
                }
            }
        }

        if ctx.dry_run {
            ctx.log.info(&format!("{restored} file(s) would be restored"));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info(&format!("{restored} file(s) restored"));
        Ok(TaskResult::Ok)
    }
}
