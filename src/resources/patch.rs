//! Anchored, reversible line edits to host files.
//!
//! A [`PatchDescriptor`] names a target file, an anchor to locate, an
//! operation, and a payload. Patches are purely textual: no attempt is made
//! to understand the host file's syntax, which keeps this module free of any
//! dependency on the host's file format.
//!
//! Removal is the primitive operation. `apply` first removes, normalising the
//! file to the guaranteed-unpatched baseline, then splices the payload back
//! in; that is what makes repeated application idempotent and removal safe on
//! a file that was never patched (the patterns simply don't occur). All
//! patches for one target file are processed as a batch so a partially
//! patched file is never left behind between individual edits.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::logging::Log;

/// Comment prefix used by `comment-and-replace` on host files (Python hosts).
const COMMENT: char = '#';

/// How a patch locates the line it edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The line is exactly this text.
    Line(&'static str),
    /// The line contains this text.
    Contains(&'static str),
}

impl Anchor {
    fn matches(&self, line: &str) -> bool {
        match self {
            Self::Line(text) => line == *text,
            Self::Contains(text) => line.contains(text),
        }
    }

    /// The anchor text, for log messages.
    #[must_use]
    pub const fn text(&self) -> &'static str {
        match self {
            Self::Line(text) | Self::Contains(text) => text,
        }
    }
}

/// The edit performed relative to the anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp {
    /// Insert the payload immediately after the anchor line.
    InsertAfter,
    /// Insert the payload immediately before the anchor line.
    InsertBefore,
    /// Comment out the anchor line and insert the payload directly beneath it.
    CommentAndReplace,
}

/// What a batch edit did to its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The file content changed (or would change, in a dry run).
    Edited,
    /// The file already had the desired content.
    Unchanged,
    /// The target file does not exist.
    NoTarget,
}

/// A single declared edit to one host file.
///
/// Descriptors are immutable and statically declared per host file; anchors
/// are coupled to the supported host version range and are expected to need
/// revision as the hosts evolve. A missing anchor is a warning, never an
/// error.
#[derive(Debug, Clone, Copy)]
pub struct PatchDescriptor {
    /// Path of the target file, relative to the host root.
    pub target: &'static str,
    /// How to find the line to edit.
    pub anchor: Anchor,
    /// The edit to perform.
    pub op: PatchOp,
    /// Line(s) to insert; may contain embedded newlines.
    pub payload: &'static str,
}

/// Group `patches` by target file, preserving declaration order.
#[must_use]
pub fn group_by_target(
    patches: &'static [PatchDescriptor],
) -> Vec<(&'static str, Vec<&'static PatchDescriptor>)> {
    let mut groups: Vec<(&'static str, Vec<&'static PatchDescriptor>)> = Vec::new();
    for patch in patches {
        if let Some((_, group)) = groups.iter_mut().find(|(t, _)| *t == patch.target) {
            group.push(patch);
        } else {
            groups.push((patch.target, vec![patch]));
        }
    }
    groups
}

/// Return `content` with every patch in `patches` removed: inserted payload
/// lines deleted and commented-out anchor lines restored.
///
/// Safe on content that was never patched: it comes back byte-identical.
#[must_use]
pub fn remove_from(content: &str, patches: &[&PatchDescriptor]) -> String {
    let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
    for patch in patches {
        delete_payload_lines(&mut lines, patch.payload);
        if patch.op == PatchOp::CommentAndReplace {
            restore_commented_anchor(&mut lines, &patch.anchor);
        }
    }
    lines.join("\n")
}

/// Return `content` with every patch applied on top of the unpatched
/// baseline (removal runs first, making this idempotent).
///
/// A patch whose anchor cannot be found is skipped with a warning; the
/// remaining patches are still applied.
#[must_use]
pub fn apply_to(content: &str, patches: &[&PatchDescriptor], log: &dyn Log) -> String {
    let normalized = remove_from(content, patches);
    let mut lines: Vec<String> = normalized.split('\n').map(String::from).collect();
    for patch in patches {
        let Some(idx) = lines.iter().position(|line| patch.anchor.matches(line)) else {
            log.warn(&format!(
                "anchor not found in {} (host version drift?): {}",
                patch.target,
                patch.anchor.text()
            ));
            continue;
        };

        let payload: Vec<String> = patch.payload.split('\n').map(String::from).collect();
        match patch.op {
            PatchOp::InsertBefore => {
                lines.splice(idx..idx, payload);
            }
            PatchOp::InsertAfter => {
                lines.splice(idx + 1..idx + 1, payload);
            }
            PatchOp::CommentAndReplace => {
                lines[idx].insert(0, COMMENT);
                lines.splice(idx + 1..idx + 1, payload);
            }
        }
    }
    lines.join("\n")
}

/// Apply all `patches` to the file at `path` as one batch (single read,
/// single write).
///
/// # Errors
///
/// Returns an error if the target file cannot be read or written.
pub fn apply_file(
    path: &Path,
    patches: &[&PatchDescriptor],
    dry_run: bool,
    log: &dyn Log,
) -> Result<PatchOutcome> {
    if !path.exists() {
        return Ok(PatchOutcome::NoTarget);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let patched = apply_to(&content, patches, log);
    if patched == content {
        return Ok(PatchOutcome::Unchanged);
    }

    if dry_run {
        log.dry_run(&format!("would patch {}", path.display()));
        return Ok(PatchOutcome::Edited);
    }

    std::fs::write(path, patched).with_context(|| format!("writing {}", path.display()))?;
    log.debug(&format!("patched {}", path.display()));
    Ok(PatchOutcome::Edited)
}

/// Remove all `patches` from the file at `path` as one batch.
///
/// A missing target file is a no-op: there is nothing to restore.
///
/// # Errors
///
/// Returns an error if the target file cannot be read or written.
pub fn remove_file(
    path: &Path,
    patches: &[&PatchDescriptor],
    dry_run: bool,
    log: &dyn Log,
) -> Result<PatchOutcome> {
    if !path.exists() {
        return Ok(PatchOutcome::NoTarget);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let restored = remove_from(&content, patches);
    if restored == content {
        return Ok(PatchOutcome::Unchanged);
    }

    if dry_run {
        log.dry_run(&format!("would restore {}", path.display()));
        return Ok(PatchOutcome::Edited);
    }

    std::fs::write(path, restored).with_context(|| format!("writing {}", path.display()))?;
    log.debug(&format!("restored {}", path.display()));
    Ok(PatchOutcome::Edited)
}

/// Delete every consecutive run of lines equal to `payload`'s lines.
fn delete_payload_lines(lines: &mut Vec<String>, payload: &str) {
    let needle: Vec<&str> = payload.split('\n').collect();
    let mut i = 0;
    while i + needle.len() <= lines.len() {
        if lines[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(line, want)| line == want)
        {
            lines.drain(i..i + needle.len());
        } else {
            i += 1;
        }
    }
}

/// Strip the comment prefix from any line that, uncommented, matches `anchor`.
fn restore_commented_anchor(lines: &mut [String], anchor: &Anchor) {
    for line in lines {
        if let Some(rest) = line.strip_prefix(COMMENT)
            && anchor.matches(rest)
        {
            *line = rest.to_string();
        }
    }
}
