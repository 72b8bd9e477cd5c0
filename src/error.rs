//! Domain-specific error types for the overlay installer.
//!
//! Engine modules return typed errors (e.g., [`MirrorError`]) while command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via the
//! standard `?` operator. Only *fatal* conditions are errors: soft failures
//! (a missing patch anchor, an unreachable update remote) are logged and the
//! run continues.

// The aggregate type is part of the public API; not every wrapper variant is
// constructed by the engine itself.
#![allow(dead_code)]

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the installer engine.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A required host application is not installed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A link-tree deployment failed.
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// The operator declined a required confirmation.
    #[error("aborted: {0}")]
    Aborted(String),
}

/// Errors raised when a host checkout is missing or unusable.
#[derive(Error, Debug)]
pub enum HostError {
    /// The host application root directory does not exist.
    #[error("{name} not found at {}: is it installed?", path.display())]
    Missing {
        /// Human-readable host name (e.g., `"Klipper"`).
        name: &'static str,
        /// The directory that was probed.
        path: PathBuf,
    },
}

/// Errors raised while deploying or retracting a symlink mirror.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// The add-on source tree to mirror does not exist.
    #[error("add-on source tree missing: {}", .0.display())]
    SourceMissing(PathBuf),

    /// An I/O error occurred underneath the mirror root.
    #[error("mirror I/O error at {path}: {source}")]
    Io {
        /// Path of the entry that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
