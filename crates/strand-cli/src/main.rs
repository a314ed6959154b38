//! Developer entry point: `strand parse` and `strand resolve`.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse(args) => commands::parse::run(args, cli.verbose),
        Command::Resolve(args) => commands::resolve::run(args, cli.verbose),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "trace" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
