//! Snapkeep CLI - sk command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod system_config;
mod util;

/// Snapkeep - retention for key-value datastore backup snapshots
#[derive(Parser)]
#[command(name = "sk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the snapshots currently in the store
    List {
        /// Snapshot store directory (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Run a single garbage collection pass
    Gc {
        /// Snapshot store directory (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Run the periodic garbage collector until interrupted
    Start {
        /// Snapshot store directory (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { store } => cmd::list::run(store).await,
        Commands::Gc { store } => cmd::gc::run(store).await,
        Commands::Start { store } => cmd::start::run(store).await,
        Commands::Config => cmd::config::run().await,
    }
}
