//! Host version gating.
//!
//! Classifies each host checkout against its supported commit window and
//! turns violations into a single confirmation question. The gate itself
//! never decides policy beyond that: declining is fatal, confirming lets the
//! run continue on the operator's head.

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::compat::{self, CompatStatus};
use crate::config::hosts::Host;
use crate::error::{HostError, SetupError};
use crate::logging::Log as _;

/// Verify both host checkouts are inside their supported revision windows.
pub struct CheckHostVersions;

impl Task for CheckHostVersions {
    fn name(&self) -> &str {
        "Check host versions"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let log = ctx.log.as_ref();
        let mut violations = Vec::new();

        for host in Host::ALL {
            let spec = host.spec();
            let root = ctx.config.host_root(host);
            match compat::check(root, &spec.range(), log)? {
                CompatStatus::Skipped => {
                    if spec.required {
                        return Err(HostError::Missing {
                            name: spec.name,
                            path: root.to_path_buf(),
                        }
                        .into());
                    }
                    log.info(&format!("{} not installed; skipping it", spec.name));
                }
                CompatStatus::Checked(report) => {
                    if report.too_old {
                        violations.push(format!(
                            "{} checkout {} predates the oldest supported revision",
                            spec.name, report.head
                        ));
                    }
                    if report.too_new {
                        violations.push(format!(
                            "{} checkout {} is ahead of the latest supported revision",
                            spec.name, report.head
                        ));
                    }
                    if report.is_compatible() {
                        log.debug(&format!(
                            "{} checkout {} is within the supported range",
                            spec.name, report.head
                        ));
                    }
                }
            }
        }

        if violations.is_empty() {
            return Ok(TaskResult::Ok);
        }

        for violation in &violations {
            log.warn(violation);
        }

        if ctx.dry_run {
            log.dry_run("would ask for confirmation to continue despite the version mismatch");
            return Ok(TaskResult::DryRun);
        }

        if ctx
            .prompter
            .confirm("Host versions are outside the supported range. Continue anyway?", false)?
        {
            log.warn("continuing on an unsupported host revision");
            Ok(TaskResult::Ok)
        } else {
            Err(SetupError::Aborted("host version check declined".to_string()).into())
        }
    }
}
