use clap::Parser;
use tracing_subscriber::EnvFilter;

use ystr_matcher::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("ystr_matcher=debug,info")
    } else {
        EnvFilter::new("ystr_matcher=warn")
    };

    // stdout carries results and the worker protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Search(args) => {
            cli::search::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Compare(args) => {
            cli::compare::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Panels(args) => {
            cli::panels::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Worker(args) => {
            cli::worker::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
