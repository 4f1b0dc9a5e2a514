//! Planewar CLI
//!
//! This CLI provides a unified interface for:
//! - Training the Q-learning agent in the headless arena
//! - Watching the trained agent play a live session
//! - Inspecting and exporting the learned Q-table

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "planewar")]
#[command(version, about = "Arcade shooter played by a Q-learning agent", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the agent over a number of episodes
    Train(Box<planewar::cli::commands::train::TrainArgs>),

    /// Run a live session with the trained agent
    Play(Box<planewar::cli::commands::play::PlayArgs>),

    /// Summarize a saved Q-table
    Inspect(planewar::cli::commands::inspect::InspectArgs),

    /// Export a saved Q-table as CSV
    Export(planewar::cli::commands::export::ExportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    planewar::logging::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Train(args) => planewar::cli::commands::train::execute(*args),
        Commands::Play(args) => planewar::cli::commands::play::execute(*args),
        Commands::Inspect(args) => planewar::cli::commands::inspect::execute(args),
        Commands::Export(args) => planewar::cli::commands::export::execute(args),
    }
}
