mod cli;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "txport=debug" } else { "txport=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Import(args) => cli::import::run(&args),
        Commands::Columns => cli::columns::run(),
        Commands::Init { force } => cli::init::run(force),
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "Error:".red());
        std::process::exit(1);
    }
}
