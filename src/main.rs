//! Streamkap provider CLI
//!
//! Operator commands for inspecting schemas and managing resources

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use streamkap_provider::cli::{Cli, Runner};
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.name();
    Runner::new(cli)
        .run()
        .await
        .with_context(|| format!("{command} failed"))
}
