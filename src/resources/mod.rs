//! Filesystem primitives the installer drives: single symlinks, whole link
//! trees, and anchored text patches.
//!
//! Each primitive is idempotent on its own, so the task layer can re-run any
//! of them without guarding against prior state.
pub mod link_tree;
pub mod patch;
pub mod symlink;
