//! Installer self-update.
//!
//! Before any install or uninstall action the installer synchronises its own
//! repository with upstream so the overlay it deploys matches what the remote
//! publishes. The remote query runs on a worker thread bounded by a short
//! timeout; an unreachable remote, a pinned (detached) checkout, or any git
//! failure (including a client without the required capability) skips the
//! update with a warning and never aborts the run.
//!
//! When the branch is advanced, a restart is *requested* via the context; the
//! top-level caller decides how to re-execute. The
//! [`RESTART_GUARD_ENV`] variable is set on the re-executed process so the
//! lineage never updates twice.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use git2::{Oid, Repository, Signature, StashFlags};

use super::{Context, Task, TaskResult};
use crate::logging::Log;

/// Environment variable marking a process re-executed after a self-update.
pub const RESTART_GUARD_ENV: &str = "MMS_SETUP_RESTARTED";

/// Message attached to the auto-stash so operators can find their edits.
pub const STASH_MESSAGE: &str = "mms-setup: auto-stash before self-update";

/// How long the branch/remote query may take before the remote is treated as
/// unreachable.
const REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Synchronise the installer repository with its upstream.
pub struct SyncSetupRepo;

impl Task for SyncSetupRepo {
    fn name(&self) -> &str {
        "Sync installer repository"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.skip_update
            && std::env::var_os(RESTART_GUARD_ENV).is_none()
            && ctx.config.source_root.join(".git").exists()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let log = ctx.log.as_ref();
        let state = match query_remote_state(ctx.config.source_root.clone()) {
            Ok(Some(state)) => state,
            Ok(None) => {
                log.warn("remote unreachable (query timed out); continuing without updating");
                return Ok(TaskResult::Skipped("remote unreachable".to_string()));
            }
            Err(e) => {
                log.warn(&format!("self-update skipped: {e:#}"));
                return Ok(TaskResult::Skipped("git query failed".to_string()));
            }
        };

        match state {
            RemoteState::Detached => {
                log.info("checkout is pinned (not on a branch); continuing as-is");
                Ok(TaskResult::Skipped("not on a branch".to_string()))
            }
            RemoteState::UpToDate => {
                log.info("already up to date");
                Ok(TaskResult::Ok)
            }
            RemoteState::Diverged { branch } => {
                log.warn(&format!(
                    "local {branch} has diverged from its remote; continuing without updating"
                ));
                Ok(TaskResult::Skipped("history diverged".to_string()))
            }
            RemoteState::Behind { branch, remote_tip } => {
                if ctx.dry_run {
                    log.dry_run(&format!("would fast-forward {branch} to {remote_tip}"));
                    return Ok(TaskResult::DryRun);
                }
                match advance(&ctx.config.source_root, &branch, remote_tip, log) {
                    Ok(()) => {
                        ctx.request_restart();
                        log.info("installer updated; restart required");
                        Ok(TaskResult::Ok)
                    }
                    Err(e) => {
                        log.warn(&format!("self-update failed: {e:#}; continuing as-is"));
                        Ok(TaskResult::Skipped("update failed".to_string()))
                    }
                }
            }
        }
    }
}

/// Relationship between the local branch and its fetched remote tip.
#[derive(Debug)]
enum RemoteState {
    /// HEAD is not on a branch (e.g., pinned to a tag).
    Detached,
    /// Local branch equals the remote tip.
    UpToDate,
    /// Remote tip is strictly ahead; a fast-forward is possible.
    Behind { branch: String, remote_tip: Oid },
    /// Local history is not an ancestor of the remote tip.
    Diverged { branch: String },
}

/// Determine the current branch, fetch, and compare against the remote tip,
/// all on a worker thread bounded by [`REMOTE_TIMEOUT`].
///
/// Returns `Ok(None)` on timeout. The worker is left to finish in the
/// background; it only reads repository state and its result is discarded.
fn query_remote_state(repo_path: PathBuf) -> Result<Option<RemoteState>> {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(remote_state(&repo_path));
    });
    match rx.recv_timeout(REMOTE_TIMEOUT) {
        Ok(result) => result.map(Some),
        Err(std::sync::mpsc::RecvTimeoutError::Timeout) => Ok(None),
        Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
            anyhow::bail!("remote query worker terminated unexpectedly")
        }
    }
}

fn remote_state(repo_path: &Path) -> Result<RemoteState> {
    let repo = Repository::open(repo_path)
        .with_context(|| format!("opening {}", repo_path.display()))?;
    if repo.head_detached().context("inspecting HEAD")? {
        return Ok(RemoteState::Detached);
    }

    let head = repo.head().context("resolving HEAD")?;
    let branch = head.shorthand().unwrap_or("HEAD").to_string();
    let local = head.peel_to_commit().context("resolving local tip")?.id();
    drop(head);

    let mut remote = repo.find_remote("origin").context("locating origin")?;
    remote
        .fetch(&[branch.as_str()], None, None)
        .with_context(|| format!("fetching {branch}"))?;

    let remote_tip = repo
        .find_reference(&format!("refs/remotes/origin/{branch}"))
        .and_then(|r| r.peel_to_commit())
        .with_context(|| format!("resolving origin/{branch}"))?
        .id();

    if remote_tip == local {
        Ok(RemoteState::UpToDate)
    } else if repo
        .graph_descendant_of(remote_tip, local)
        .context("walking commit graph")?
    {
        Ok(RemoteState::Behind { branch, remote_tip })
    } else {
        Ok(RemoteState::Diverged { branch })
    }
}

/// Stash any uncommitted modifications, then fast-forward `branch` to
/// `remote_tip` and check it out.
fn advance(repo_path: &Path, branch: &str, remote_tip: Oid, log: &dyn Log) -> Result<()> {
    let mut repo = Repository::open(repo_path)
        .with_context(|| format!("opening {}", repo_path.display()))?;

    if has_local_changes(&repo)? {
        let sig = repo
            .signature()
            .or_else(|_| Signature::now("mms-setup", "mms-setup@localhost"))
            .context("building stash signature")?;
        repo.stash_save(&sig, STASH_MESSAGE, Some(StashFlags::INCLUDE_UNTRACKED))
            .context("stashing local changes")?;
        log.info(&format!("local changes stashed ({STASH_MESSAGE})"));
    }

    repo.find_reference(&format!("refs/heads/{branch}"))
        .with_context(|| format!("locating branch {branch}"))?
        .set_target(remote_tip, "mms-setup: fast-forward to remote tip")
        .context("advancing branch")?;
    repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
        .context("checking out updated tree")?;

    log.debug(&format!("{branch} fast-forwarded to {remote_tip}"));
    Ok(())
}

fn has_local_changes(repo: &Repository) -> Result<bool> {
    let mut opts = git2::StatusOptions::new();
    opts.include_untracked(true);
    let statuses = repo
        .statuses(Some(&mut opts))
        .context("reading worktree status")?;
    Ok(!statuses.is_empty())
}
