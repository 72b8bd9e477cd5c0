// Shared helpers for integration tests.
//
// Builds a temporary world containing an add-on source tree and git-backed
// host checkouts, so each integration test gets an isolated filesystem
// without repeating the setup boilerplate.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{Oid, Repository, Signature};

use mms_setup::config::Config;
use mms_setup::logging::Logger;
use mms_setup::prompt::Prompter;
use mms_setup::tasks::Context;

/// Baseline content of the Klipper file targeted by the neopixel patches.
pub const NEOPIXEL_BASELINE: &str = "\
# Support for neopixel LED chains
BIT_MAX_TIME=.000004
RESET_MIN_TIME=.000050

class PrinterNeoPixel:
    def __init__(self, config):
        pass
";

/// Baseline content of the KlipperScreen main screen module.
pub const SCREEN_BASELINE: &str = "\
import logging
from ks_includes.KlippyGtk import KlippyGtk
from ks_includes.files import KlippyFiles

class KlipperScreen:
    def bootstrap(self):
        self.base_panel = BasePanel(self)
        self.base_panel.show()
";

/// Baseline content of the KlipperScreen file-listing module.
pub const FILES_BASELINE: &str = "\
import os

class KlippyFiles:
    def add_file(self, filepath, notify=True):
        self.files.append(filepath)
";

/// An isolated world rooted in a temporary directory:
///
/// - `<root>/mms`           — add-on source tree
/// - `<root>/klipper`       — Klipper host checkout (git)
/// - `<root>/KlipperScreen` — KlipperScreen host checkout (git)
pub struct TestWorld {
    pub root: tempfile::TempDir,
}

impl TestWorld {
    /// Create a world with the add-on source tree and both hosts in place.
    pub fn new() -> Self {
        let world = Self::bare();
        world.setup_addon_source();
        world.setup_klipper_host();
        world.setup_screen_host();
        world
    }

    /// Create a world with only the temporary root (no trees yet).
    pub fn bare() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn addon_root(&self) -> PathBuf {
        self.path().join("mms")
    }

    pub fn klipper_root(&self) -> PathBuf {
        self.path().join("klipper")
    }

    pub fn screen_root(&self) -> PathBuf {
        self.path().join("KlipperScreen")
    }

    /// Write the add-on source tree: firmware modules plus the screen panel
    /// package, with a few files that must not be mirrored.
    pub fn setup_addon_source(&self) {
        let klippy = self.addon_root().join("klippy/extras/mms");
        std::fs::create_dir_all(klippy.join("core")).expect("create klippy subtree");
        std::fs::write(klippy.join("klippy.py"), "# entry module\n").expect("write module");
        std::fs::write(klippy.join("core/slot.py"), "# slot handling\n").expect("write module");
        std::fs::write(klippy.join("core/buffer.py"), "# buffer logic\n").expect("write module");
        std::fs::write(klippy.join("README.md"), "docs, not mirrored\n").expect("write readme");

        let vivid = self.addon_root().join("KlipperScreen/vivid");
        std::fs::create_dir_all(vivid.join("panels")).expect("create vivid subtree");
        std::fs::create_dir_all(vivid.join("styles")).expect("create vivid styles");
        std::fs::write(vivid.join("installer.py"), "# panel loader\n").expect("write module");
        std::fs::write(vivid.join("panels/main.py"), "# main panel\n").expect("write module");
        std::fs::write(vivid.join("styles/style.css"), ".vivid {}\n").expect("write css");
        std::fs::write(vivid.join("vivid_logo.svg"), "<svg/>\n").expect("write svg");
        std::fs::write(vivid.join("notes.txt"), "not mirrored\n").expect("write notes");
    }

    /// Initialise the Klipper host checkout with the neopixel baseline.
    pub fn setup_klipper_host(&self) {
        let root = self.klipper_root();
        std::fs::create_dir_all(root.join("klippy/extras")).expect("create klipper tree");
        std::fs::write(
            root.join("klippy/extras/neopixel.py"),
            NEOPIXEL_BASELINE,
        )
        .expect("write neopixel.py");
        init_repo_with_history(&root);
    }

    /// Initialise the KlipperScreen host checkout with the UI baselines.
    pub fn setup_screen_host(&self) {
        let root = self.screen_root();
        std::fs::create_dir_all(root.join("ks_includes")).expect("create screen tree");
        std::fs::write(root.join("screen.py"), SCREEN_BASELINE).expect("write screen.py");
        std::fs::write(root.join("ks_includes/files.py"), FILES_BASELINE)
            .expect("write files.py");
        init_repo_with_history(&root);
    }

    /// Build a [`Context`] over this world with the given prompter.
    ///
    /// Self-update is disabled; the update flow has its own scenario tests
    /// against local remotes (see `self_update.rs`).
    pub fn context(&self, prompter: Arc<dyn Prompter>, dry_run: bool) -> (Context, Arc<Logger>) {
        self.context_opts(prompter, dry_run, true)
    }

    /// Build a [`Context`] with explicit dry-run and skip-update flags.
    pub fn context_opts(
        &self,
        prompter: Arc<dyn Prompter>,
        dry_run: bool,
        skip_update: bool,
    ) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("test"));
        let config = Config {
            source_root: self.addon_root(),
            klipper_root: self.klipper_root(),
            screen_root: self.screen_root(),
        };
        let ctx = Context::new(
            config,
            Arc::clone(&log) as Arc<dyn mms_setup::logging::Log>,
            prompter,
            dry_run,
            skip_update,
        );
        (ctx, log)
    }
}

fn sig() -> Signature<'static> {
    Signature::now("test", "test@example.com").expect("build signature")
}

/// Turn `dir` into a git repository and commit everything currently in it,
/// twice, so ancestry checks have a little history to walk.
pub fn init_repo_with_history(dir: &Path) -> (Oid, Oid) {
    let repo = Repository::init(dir).expect("init repo");
    let first = commit_all(&repo, "initial checkout");
    std::fs::write(dir.join(".version"), "v0.12.0\n").expect("write version marker");
    let second = commit_all(&repo, "bump version marker");
    (first, second)
}

/// Stage every file in the worktree and commit to HEAD.
pub fn commit_all(repo: &Repository, msg: &str) -> Oid {
    let mut index = repo.index().expect("open index");
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .expect("stage files");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig(), &sig(), msg, &tree, &parents)
        .expect("commit")
}

/// Recursively snapshot `dir` as (relative path, link target or file bytes).
pub fn tree_snapshot(dir: &Path) -> Vec<(PathBuf, String)> {
    let mut out = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.file_name().is_some_and(|n| n == ".git") {
                continue;
            }
            if path.is_dir() && !path.is_symlink() {
                pending.push(path);
            } else {
                let rel = path.strip_prefix(dir).expect("relative path").to_path_buf();
                let value = std::fs::read_link(&path).map_or_else(
                    |_| std::fs::read_to_string(&path).unwrap_or_default(),
                    |target| format!("-> {}", target.display()),
                );
                out.push((rel, value));
            }
        }
    }
    out.sort();
    out
}
