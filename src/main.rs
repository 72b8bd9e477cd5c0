use std::sync::Arc;

use clap::Parser;

mod cli;
mod commands;
mod compat;
mod config;
mod error;
mod logging;
mod prompt;
mod resources;
mod tasks;

use commands::RunOutcome;
use logging::Log as _;

fn main() {
    let args = cli::Cli::parse();
    let command_name = match args.action() {
        cli::Command::Install(_) => "install",
        cli::Command::Uninstall(_) => "uninstall",
        cli::Command::Version => "version",
    };
    logging::init_subscriber(args.verbose, command_name);
    let log = Arc::new(logging::Logger::new(command_name));

    let result = match args.action() {
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        cli::Command::Uninstall(opts) => commands::uninstall::run(&args.global, &opts, &log),
        cli::Command::Version => {
            let version = option_env!("MMS_SETUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("mms-setup {version}");
            Ok(RunOutcome::Done)
        }
    };

    match result {
        Ok(RunOutcome::Done) => {}
        Ok(RunOutcome::Restart) => std::process::exit(reexec(&log)),
        Err(e) => {
            log.error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Re-execute this binary with the original arguments after a self-update.
///
/// The guard variable stops the child from updating again, so one invocation
/// restarts at most once. The parent waits and hands the child's exit code
/// through; no two copies continue running concurrently.
fn reexec(log: &logging::Logger) -> i32 {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            log.error(&format!("cannot locate own executable for restart: {e}"));
            return 1;
        }
    };

    log.info("re-executing with the updated installer");
    let status = std::process::Command::new(exe)
        .args(std::env::args_os().skip(1))
        .env(tasks::update::RESTART_GUARD_ENV, "1")
        .status();

    match status {
        Ok(status) => status.code().unwrap_or(1),
        Err(e) => {
            log.error(&format!("restart failed: {e}"));
            1
        }
    }
}
