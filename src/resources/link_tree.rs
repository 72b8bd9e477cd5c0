//! Symlink mirror of an add-on source tree.
//!
//! `deploy` walks the source tree and recreates its directory structure under
//! the destination, linking every file whose extension is in the requested
//! set back to the source file's absolute path. The destination never owns
//! content: `remove` deletes the mirrored subtree and leaves the source
//! untouched.
//!
//! Review note for reimplementers: `remove` deletes whatever `dest_root`
//! names. There is no built-in containment check; pointing it outside the
//! intended mirror location is the caller's bug.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::MirrorError;
use crate::logging::Log;
use crate::resources::symlink::{Link, LinkChange};

/// Counters describing what a [`deploy`] pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorStats {
    /// Links created or retargeted.
    pub linked: u32,
    /// Links that already pointed at the right source.
    pub already_ok: u32,
    /// Entries skipped (e.g., source vanished mid-walk).
    pub skipped: u32,
}

/// Walk every directory under `root` (including `root` itself) and return,
/// per directory, the relative directory path and the names of its direct
/// child files whose extension is in `extensions`.
///
/// Directories with zero matching files still appear (with an empty list);
/// an empty match is not a failure.
///
/// # Errors
///
/// Returns [`MirrorError::SourceMissing`] if `root` does not exist, or a
/// [`MirrorError::Io`] if a directory cannot be read.
pub fn walk(root: &Path, extensions: &[&str]) -> Result<Vec<(PathBuf, Vec<String>)>, MirrorError> {
    if !root.is_dir() {
        return Err(MirrorError::SourceMissing(root.to_path_buf()));
    }

    let mut out = Vec::new();
    let mut pending = vec![PathBuf::new()];
    while let Some(rel_dir) = pending.pop() {
        let abs_dir = root.join(&rel_dir);
        let entries = std::fs::read_dir(&abs_dir).map_err(|source| MirrorError::Io {
            path: abs_dir.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| MirrorError::Io {
                path: abs_dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(rel_dir.join(entry.file_name()));
            } else if has_extension(&path, extensions) {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        out.push((rel_dir, files));
    }

    out.sort();
    Ok(out)
}

/// Mirror `source_root` into `dest_root` as a tree of symlinks.
///
/// Re-invoking against an unchanged source tree leaves the destination in the
/// same final state; overwriting an existing identical link is counted, not
/// treated as an error.
///
/// # Errors
///
/// Returns an error if `source_root` does not exist, or on I/O failure while
/// creating directories or links.
pub fn deploy(
    source_root: &Path,
    dest_root: &Path,
    extensions: &[&str],
    dry_run: bool,
    log: &dyn Log,
) -> Result<MirrorStats> {
    // Link targets are absolute so the mirror works from any working
    // directory.
    let source_root = source_root
        .canonicalize()
        .map_err(|_| MirrorError::SourceMissing(source_root.to_path_buf()))?;

    let mut stats = MirrorStats::default();
    for (rel_dir, files) in walk(&source_root, extensions)? {
        let dest_dir = dest_root.join(&rel_dir);
        if dry_run {
            if !dest_dir.is_dir() {
                log.dry_run(&format!("would create {}", dest_dir.display()));
            }
        } else {
            std::fs::create_dir_all(&dest_dir).map_err(|source| MirrorError::Io {
                path: dest_dir.display().to_string(),
                source,
            })?;
        }

        for name in files {
            let link = Link::new(source_root.join(&rel_dir).join(&name), dest_dir.join(&name));
            if dry_run {
                log.dry_run(&format!("would link {}", link.describe()));
                stats.linked += 1;
                continue;
            }
            match link.ensure()? {
                LinkChange::Created => {
                    log.debug(&format!("linked {}", link.describe()));
                    stats.linked += 1;
                }
                LinkChange::Kept => stats.already_ok += 1,
                LinkChange::Skipped { reason } => {
                    log.debug(&format!("skipping {}: {reason}", link.describe()));
                    stats.skipped += 1;
                }
            }
        }
    }
    Ok(stats)
}

/// Delete the mirrored subtree at `dest_root`.
///
/// Returns `true` if something was removed, `false` if the mirror was not
/// present. Never touches the source tree: only the links are deleted, the
/// content they reference stays where it is.
///
/// # Errors
///
/// Returns an error if the subtree exists but cannot be deleted.
pub fn remove(dest_root: &Path, dry_run: bool, log: &dyn Log) -> Result<bool, MirrorError> {
    if dest_root.symlink_metadata().is_err() {
        return Ok(false);
    }
    if dry_run {
        log.dry_run(&format!("would remove {}", dest_root.display()));
        return Ok(true);
    }
    std::fs::remove_dir_all(dest_root).map_err(|source| MirrorError::Io {
        path: dest_root.display().to_string(),
        source,
    })?;
    log.debug(&format!("removed {}", dest_root.display()));
    Ok(true)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.contains(&e))
}
