//! Knowtable CLI
//!
//! Command-line front end for the knowtable LLM service.

use anyhow::Result;
use clap::Parser;
use knowtable_core::{create_llm_service, Config};

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    // Load config (KNOWTABLE_CONFIG overrides the default path)
    let mut config = Config::load()?;
    if let Some(mode) = cli.mode {
        config.llm.completion_mode = mode.into();
    }

    let service = create_llm_service(&config.llm)?;

    match cli.command {
        Commands::Complete(args) => commands::complete::run(args, service.as_ref(), cli.format).await,
        Commands::Embed(args) => commands::embed::run(args, service.as_ref(), cli.format).await,
        Commands::Decompose(args) => {
            commands::decompose::run(args, service.as_ref(), cli.format).await
        }
        Commands::Status => commands::status::run(&config.llm, service.as_ref(), cli.format).await,
    }
}
