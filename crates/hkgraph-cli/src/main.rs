//! hkgraph CLI - command-line interface for the hkgraph dataflow engine.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hkgraph")]
#[command(author, version, about = "hkgraph dataflow engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate identifiers and check their text round trip
    Ids(commands::ids::IdsArgs),

    /// Parse an identifier and print its canonical form
    Parse(commands::parse::ParseArgs),

    /// List registered node processors
    Processors(commands::processors::ProcessorsArgs),

    /// Push one payload through a processor chain
    Run(commands::run::RunArgs),
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `fallback`; without either the level is `info`.
pub(crate) fn init_tracing(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| fallback.unwrap_or("info").into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `run` reads its filter from the graph config before installing logging.
    if !matches!(cli.command, Commands::Run(_)) {
        init_tracing(None);
    }

    match cli.command {
        Commands::Ids(args) => commands::ids::run(&args),
        Commands::Parse(args) => commands::parse::run(&args),
        Commands::Processors(args) => commands::processors::run(&args),
        Commands::Run(args) => commands::run::run(&args),
    }
}
