//! Fleetmap CLI - command-line interface
//!
//! Mounts the live map reconciler against a routing backend and renders the
//! scene to the console.

mod commands;
mod error;
mod surface;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "fleetmap", version = fleetmap::VERSION, about = "Live delivery-fleet map reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch the live map against a routing backend.
    Watch(WatchArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Watch(args) => commands::watch::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}
