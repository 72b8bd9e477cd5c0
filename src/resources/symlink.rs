//! Single-symlink primitive.
//!
//! The add-on source tree exclusively owns file content; a deployed link is a
//! non-owning reference to the source file's absolute path, never a copy.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

/// A symlink at `dest` that must point at the absolute path of `source`.
#[derive(Debug, Clone)]
pub struct Link {
    /// The add-on source file (what the symlink points to).
    pub source: PathBuf,
    /// The path inside the host tree where the link lives.
    pub dest: PathBuf,
}

/// What currently occupies the destination of a [`Link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing is at the destination.
    Absent,
    /// A link pointing at the right source.
    Current,
    /// A link to somewhere else, or a regular file in the way.
    Wrong {
        /// What was found instead.
        found: String,
    },
    /// The source file is gone; there is nothing sensible to link to.
    Unlinkable {
        /// Why the link cannot be made.
        reason: String,
    },
}

/// What [`Link::ensure`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkChange {
    /// The link was created or retargeted.
    Created,
    /// The link already pointed at the right source.
    Kept,
    /// Nothing was done.
    Skipped {
        /// Why the link was not made.
        reason: String,
    },
}

impl Link {
    /// A link from `dest` back to `source`.
    #[must_use]
    pub const fn new(source: PathBuf, dest: PathBuf) -> Self {
        Self { source, dest }
    }

    /// `dest -> source`, for log lines.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} -> {}", self.dest.display(), self.source.display())
    }

    /// Inspect the destination without changing anything.
    #[must_use]
    pub fn state(&self) -> LinkState {
        if !self.source.exists() {
            return LinkState::Unlinkable {
                reason: format!("source does not exist: {}", self.source.display()),
            };
        }

        match std::fs::read_link(&self.dest) {
            Ok(target) if target == self.source => LinkState::Current,
            Ok(target) => LinkState::Wrong {
                found: format!("points to {}", target.display()),
            },
            Err(_) if self.dest.symlink_metadata().is_ok() => LinkState::Wrong {
                found: "destination is not a symlink".to_string(),
            },
            Err(_) => LinkState::Absent,
        }
    }

    /// Make the destination a link to the source, replacing whatever is in
    /// the way. Re-running against a correct link changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be cleared or the link
    /// cannot be created.
    pub fn ensure(&self) -> Result<LinkChange> {
        match self.state() {
            LinkState::Current => return Ok(LinkChange::Kept),
            LinkState::Unlinkable { reason } => return Ok(LinkChange::Skipped { reason }),
            LinkState::Absent => {}
            LinkState::Wrong { .. } => {
                clear_dest(&self.dest)
                    .with_context(|| format!("replacing {}", self.dest.display()))?;
            }
        }

        if let Some(parent) = self.dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::os::unix::fs::symlink(&self.source, &self.dest)
            .with_context(|| format!("linking {}", self.describe()))?;
        Ok(LinkChange::Created)
    }
}

/// Delete whatever entry sits at `dest`, including a directory.
fn clear_dest(dest: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(dest)?;
    if meta.is_dir() {
        std::fs::remove_dir_all(dest)?;
    } else {
        std::fs::remove_file(dest)?;
    }
    Ok(())
}
