//! Overlay installer for the MMS multi-material add-on.
//!
//! Deploys the add-on into two independently versioned host applications —
//! the Klipper firmware daemon and the KlipperScreen touchscreen UI — without
//! owning either host's source tree: add-on modules are mirrored as symlinks
//! into each host's module directory, and a small set of anchored, reversible
//! text patches splices the add-on into specific host files.
//!
//! The public API is organised into layers:
//!
//! - **[`compat`]** — commit-ancestry version gating of host checkouts
//! - **[`resources`]** — idempotent primitives: symlinks, link trees, patches
//! - **[`tasks`]** — named units of work (self-update, deploy, patch) driven
//!   by an explicit [`tasks::Context`]
//! - **[`commands`]** — top-level `install` / `uninstall` orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod compat;
pub mod config;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod resources;
pub mod tasks;
