//! Grapple CLI - tabular TD sandbox for a two-player grappling match
//!
//! This CLI provides:
//! - Training the TD agent over a number of episodes
//! - Inspecting the state space and decoding state indices

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "grapple")]
#[command(version, about = "Tabular TD sandbox for a grappling match", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run training episodes and print the value table
    Train(Box<grapple::cli::commands::train::TrainArgs>),

    /// Describe the state space
    Inspect(grapple::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => grapple::cli::commands::train::execute(*args),
        Commands::Inspect(args) => grapple::cli::commands::inspect::execute(args),
    }
}
