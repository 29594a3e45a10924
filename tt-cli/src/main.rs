mod cli;
mod commands;
mod config;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("Command failed: {:?}", err);
            output::print_error(&output::describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = config::resolve_path(cli.config)?;
    tracing::debug!("Using config at {}", config_path.display());

    match cli.command {
        Commands::Load(args) => commands::load::run(args, &config_path).await,
        Commands::Show(args) => commands::show::run(args, &config_path).await,
        Commands::Batch(args) => commands::batch::run(args, &config_path).await,
    }
}

// Logs go to stderr so `show --json` output stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,timetracker=debug,tt=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
