mod cli;
mod commands;

use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use commands::{fetch, inspect, render, summary};

/// `-v` shows progress, `-vv` debug detail; warnings are always shown.
/// `RUST_LOG` overrides the flag. Library output goes through `log`, which the
/// subscriber picks up.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Render(args) => render::run(&cli, args),
        Commands::Summary(args) => summary::run(&cli, args),
        Commands::Fetch(args) => fetch::run(&cli, args),
        Commands::Inspect(args) => inspect::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
