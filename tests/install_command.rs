//! End-to-end install flows against temporary host checkouts.

mod common;

use std::sync::Arc;

use common::TestWorld;
use mms_setup::commands::{self, RunOutcome};
use mms_setup::prompt::ScriptedPrompter;
use mms_setup::tasks;

/// Both synthetic host histories lack the declared supported commits, so a
/// full install always raises exactly one version confirmation.
fn confirming_prompter() -> Arc<ScriptedPrompter> {
    Arc::new(ScriptedPrompter::new(&[true]))
}

#[test]
fn install_deploys_mirrors_and_patches_both_hosts() {
    let world = TestWorld::new();
    let (ctx, log) = world.context(confirming_prompter(), false);

    let outcome = commands::run_tasks(&tasks::install_tasks(), &ctx, &log).expect("install");
    assert_eq!(outcome, RunOutcome::Done);

    // Firmware side: mirror in place, only .py files linked.
    let module_dir = world.klipper_root().join("klippy/extras/mms");
    assert!(module_dir.join("klippy.py").is_symlink());
    assert!(module_dir.join("core/slot.py").is_symlink());
    assert!(module_dir.join("core/buffer.py").is_symlink());
    assert!(!module_dir.join("README.md").exists());

    // Firmware side: neopixel timings rewritten reversibly.
    let neopixel =
        std::fs::read_to_string(world.klipper_root().join("klippy/extras/neopixel.py"))
            .expect("read neopixel.py");
    assert!(neopixel.contains("#BIT_MAX_TIME=.000004"));
    assert!(neopixel.contains("BIT_MAX_TIME=.000030"));
    assert!(neopixel.contains("#RESET_MIN_TIME=.000050"));
    assert!(neopixel.contains("RESET_MIN_TIME=.000250"));

    // UI side: panel package mirrored with its assets, extras left out.
    let vivid = world.screen_root().join("vivid");
    assert!(vivid.join("installer.py").is_symlink());
    assert!(vivid.join("panels/main.py").is_symlink());
    assert!(vivid.join("styles/style.css").is_symlink());
    assert!(vivid.join("vivid_logo.svg").is_symlink());
    assert!(!vivid.join("notes.txt").exists());

    // UI side: loader spliced into screen.py, dialogs filtered in files.py.
    let screen = std::fs::read_to_string(world.screen_root().join("screen.py"))
        .expect("read screen.py");
    assert!(screen.contains("from vivid.installer import install_vivid"));
    assert!(screen.contains("        install_vivid(self.base_panel)"));
    let files = std::fs::read_to_string(world.screen_root().join("ks_includes/files.py"))
        .expect("read files.py");
    assert!(files.contains("if filepath.startswith('vivid/'):"));
}

#[test]
fn install_twice_is_idempotent() {
    let world = TestWorld::new();

    let (ctx, log) = world.context(confirming_prompter(), false);
    commands::run_tasks(&tasks::install_tasks(), &ctx, &log).expect("first install");
    let klipper_first = common::tree_snapshot(&world.klipper_root());
    let screen_first = common::tree_snapshot(&world.screen_root());

    let (ctx, log) = world.context(confirming_prompter(), false);
    commands::run_tasks(&tasks::install_tasks(), &ctx, &log).expect("second install");

    assert_eq!(common::tree_snapshot(&world.klipper_root()), klipper_first);
    assert_eq!(common::tree_snapshot(&world.screen_root()), screen_first);
}

#[test]
fn declined_version_confirmation_aborts_untouched() {
    let world = TestWorld::new();
    let (ctx, log) = world.context(Arc::new(ScriptedPrompter::new(&[false])), false);

    let err = commands::run_tasks(&tasks::install_tasks(), &ctx, &log).unwrap_err();
    assert!(err.to_string().contains("declined"));

    // Neither the mirror nor the patch engine ran.
    assert!(!world.klipper_root().join("klippy/extras/mms").exists());
    assert_eq!(
        std::fs::read_to_string(world.klipper_root().join("klippy/extras/neopixel.py"))
            .expect("read neopixel.py"),
        common::NEOPIXEL_BASELINE
    );
    assert_eq!(
        std::fs::read_to_string(world.screen_root().join("screen.py")).expect("read screen.py"),
        common::SCREEN_BASELINE
    );
}

#[test]
fn missing_klipper_checkout_is_fatal() {
    let world = TestWorld::bare();
    world.setup_addon_source();
    world.setup_screen_host();
    let (ctx, log) = world.context(confirming_prompter(), false);

    let err = commands::run_tasks(&tasks::install_tasks(), &ctx, &log).unwrap_err();
    assert!(err.to_string().contains("Klipper not found"));
    assert!(!world.screen_root().join("vivid").exists());
}

#[test]
fn missing_screen_checkout_is_tolerated() {
    let world = TestWorld::bare();
    world.setup_addon_source();
    world.setup_klipper_host();
    let (ctx, log) = world.context(confirming_prompter(), false);

    let outcome = commands::run_tasks(&tasks::install_tasks(), &ctx, &log).expect("install");
    assert_eq!(outcome, RunOutcome::Done);

    assert!(
        world
            .klipper_root()
            .join("klippy/extras/mms/klippy.py")
            .is_symlink()
    );
    assert!(!world.screen_root().exists());
}

#[test]
fn dry_run_install_changes_nothing() {
    let world = TestWorld::new();
    let klipper_before = common::tree_snapshot(&world.klipper_root());
    let screen_before = common::tree_snapshot(&world.screen_root());

    let (ctx, log) = world.context(Arc::new(ScriptedPrompter::new(&[])), true);
    let outcome = commands::run_tasks(&tasks::install_tasks(), &ctx, &log).expect("dry run");
    assert_eq!(outcome, RunOutcome::Done);

    assert_eq!(common::tree_snapshot(&world.klipper_root()), klipper_before);
    assert_eq!(common::tree_snapshot(&world.screen_root()), screen_before);
}

#[test]
fn missing_addon_source_tree_is_fatal() {
    let world = TestWorld::bare();
    world.setup_klipper_host();
    world.setup_screen_host();
    let (ctx, log) = world.context(confirming_prompter(), false);

    let err = commands::run_tasks(&tasks::install_tasks(), &ctx, &log).unwrap_err();
    assert!(err.to_string().contains("source tree missing"));
}
