use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

mod completion;
mod dispatch;
mod dry_run;
mod flows;
mod logging;
mod render;

use crate::render::ColorChoice;

#[derive(Parser, Debug)]
#[command(name = "envsync")]
#[command(
    about = "Update a conda environment with pruning and mamba in a reproducible manner",
    long_about = None
)]
pub(crate) struct Cli {
    /// Environment prefix; defaults to the manifest's `prefix`, else ./.conda
    #[arg(long, global = true)]
    prefix: Option<String>,
    #[arg(long, global = true, default_value = "environment.yml")]
    file: PathBuf,
    /// envsync.toml settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print package-manager commands and file changes without applying them
    #[arg(long, global = true)]
    dry_run: bool,
    /// Answer yes to package-manager prompts
    #[arg(short = 'y', long, global = true)]
    yes: bool,
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Create the environment, or prune and update an existing one
    Sync,
    /// Remove installed packages the manifest no longer requires
    Prune {
        /// Extra arguments forwarded to the remove command
        #[arg(last = true)]
        extra: Vec<String>,
    },
    /// Write an explicit spec file of the installed packages
    Freeze,
    /// Recreate the environment from the explicit spec file
    Replicate,
    /// Print a shell completion script
    Completions { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match dispatch::run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
