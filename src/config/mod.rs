//! Runtime configuration: resolved paths for the add-on source tree and the
//! two host checkouts.
//!
//! There is no config file: the engine's knowledge of the hosts is static
//! (see [`hosts`]) and everything else is a path, resolved from CLI flags,
//! environment variables, or defaults, in that order.

pub mod hosts;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use self::hosts::Host;

/// Resolved paths for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the add-on source repository (also the installer's own repo).
    pub source_root: PathBuf,
    /// Root of the Klipper checkout.
    pub klipper_root: PathBuf,
    /// Root of the KlipperScreen checkout.
    pub screen_root: PathBuf,
}

impl Config {
    /// Resolve all paths from CLI options, environment, and defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown while a default is
    /// needed, or if the add-on source root cannot be located.
    pub fn resolve(global: &GlobalOpts) -> Result<Self> {
        let source_root = resolve_source_root(global)?;
        let klipper_root = resolve_host_dir(global.klipper_dir.as_deref(), "KLIPPER_DIR", "klipper")?;
        let screen_root = resolve_host_dir(
            global.screen_dir.as_deref(),
            "KLIPPERSCREEN_DIR",
            "KlipperScreen",
        )?;
        Ok(Self {
            source_root,
            klipper_root,
            screen_root,
        })
    }

    /// Root directory of the named host's checkout.
    #[must_use]
    pub fn host_root(&self, host: Host) -> &Path {
        match host {
            Host::Klippy => &self.klipper_root,
            Host::Screen => &self.screen_root,
        }
    }

    /// Absolute path of the add-on subtree mirrored into `host`.
    #[must_use]
    pub fn source_subtree(&self, host: Host) -> PathBuf {
        self.source_root.join(host.spec().source_subtree)
    }

    /// Absolute path of the module directory inside `host` that receives the
    /// mirror.
    #[must_use]
    pub fn module_dir(&self, host: Host) -> PathBuf {
        self.host_root(host).join(host.spec().module_dir)
    }
}

/// `true` if `dir` looks like the add-on source repository.
fn is_source_root(dir: &Path) -> bool {
    dir.join(hosts::KLIPPY.source_subtree).is_dir()
}

fn resolve_source_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(root) = &global.root {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var("MMS_SOURCE_DIR") {
        return Ok(PathBuf::from(root));
    }

    // The binary usually lives inside the add-on repository; probe upward
    // from its location.
    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [parent.join("../.."), parent.join("..")];
        for candidate in &candidates {
            if is_source_root(candidate) {
                return std::fs::canonicalize(candidate).context("canonicalizing source root");
            }
        }
    }

    let cwd = std::env::current_dir().context("reading current directory")?;
    if is_source_root(&cwd) {
        return Ok(cwd);
    }

    anyhow::bail!("cannot locate the add-on source tree; use --root or set MMS_SOURCE_DIR")
}

fn resolve_host_dir(
    flag: Option<&Path>,
    env_var: &str,
    default_name: &str,
) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var(env_var) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home).join(default_name))
}
