//! git-pilot: distribute rendered templates to many repositories.
//!
//! # Usage
//!
//! ```text
//! git-pilot init --template-dir <dir>
//! git-pilot sync --template-dir <dir> --values <file> [--token ..] [--non-interactive] [--dry-run]
//! git-pilot drift-detect [--token ..] [--reconcile] [--non-interactive]
//! git-pilot status [--state-file <file>] [--json]
//! ```

mod commands;
mod output;
mod provider;
mod viewer;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{drift::DriftArgs, init::InitArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "git-pilot",
    version,
    about = "Sync templated files across many repositories and branches",
    long_about = None,
)]
struct Cli {
    /// Log progress to stderr (same as RUST_LOG=info).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write an example template directory and values.yml.
    Init(InitArgs),

    /// Render templates, show the plan and apply it to every configured repository.
    Sync(SyncArgs),

    /// Compare remote files with the recorded state and optionally restore them.
    DriftDetect(DriftArgs),

    /// List every file recorded in the state file.
    Status(StatusArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::DriftDetect(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
