//! gitbridge: mirror a GitHub repository to GitLab and report GitLab
//! pipelines back as GitHub check-runs.
//!
//! # Usage
//!
//! ```text
//! gitbridge serve [--config FILE] [--port N] [--secret S] [--github URL] [--gitlab URL] ...
//! gitbridge sync <branch> [--config FILE] [...]
//! gitbridge sync --all [--config FILE] [...]
//! gitbridge status [--addr HOST:PORT]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{serve::ServeArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gitbridge",
    version,
    about = "Mirror GitHub pushes to GitLab and relay GitLab pipelines as GitHub check-runs",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Listen for webhooks from both hosts until interrupted.
    Serve(ServeArgs),

    /// Mirror one branch (or all branches) once and exit.
    Sync(SyncArgs),

    /// Query a running bridge's status endpoint.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
