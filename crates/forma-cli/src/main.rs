//! Forma CLI - approximate audio with square and triangle waves.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forma")]
#[command(author, version, about = "Causal square and triangle wave approximation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a WAV file into square/triangle passes
    Process(commands::process::ProcessArgs),

    /// Generate the three-tone test signal
    Generate(commands::generate::GenerateArgs),

    /// Print the execution order of a plan's streaming graph
    Order(commands::order::OrderArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Order(args) => commands::order::run(args),
    }
}
