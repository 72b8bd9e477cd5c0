use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the MMS overlay installer.
#[derive(Parser, Debug)]
#[command(
    name = "mms-setup",
    about = "Install or remove the MMS add-on for Klipper and KlipperScreen",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Show debug detail on the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The action to run; a bare invocation defaults to `install`.
    #[must_use]
    pub fn action(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Install(InstallOpts {}))
    }
}

/// Flags accepted by every subcommand.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Skip the installer self-update step
    #[arg(long, global = true)]
    pub skip_update: bool,

    /// Report what would change without touching anything
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the add-on source root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Override the Klipper checkout directory (default: ~/klipper)
    #[arg(long, global = true)]
    pub klipper_dir: Option<std::path::PathBuf>,

    /// Override the KlipperScreen checkout directory (default: ~/KlipperScreen)
    #[arg(long, global = true)]
    pub screen_dir: Option<std::path::PathBuf>,
}

/// The mutually exclusive actions.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Deploy the add-on into the host applications (default)
    Install(InstallOpts),
    /// Remove the add-on from the host applications
    Uninstall(UninstallOpts),
    /// Print the installer version
    Version,
}

/// `install` has no options of its own yet; host paths are global flags.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {}

/// `uninstall` has no options of its own.
#[derive(Parser, Debug, Clone)]
pub struct UninstallOpts {}
