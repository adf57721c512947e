//! barrido CLI - sweep measurements and Hammerstein models from the command line.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "barrido")]
#[command(author, version, about = "Exponential sweep measurement and nonlinear modelling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sweep or its inverse filter
    Generate(commands::generate::GenerateArgs),

    /// Run a WAV file through a Hammerstein group model
    Simulate(commands::simulate::SimulateArgs),

    /// Deconvolve a sweep response into impulse responses
    Deconvolve(commands::deconvolve::DeconvolveArgs),

    /// Show WAV file information
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Deconvolve(args) => commands::deconvolve::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
