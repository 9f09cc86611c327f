//! Metarag CLI
//!
//! Metadata-filtered retrieval over technical documentation.

use anyhow::Result;
use clap::Parser;
use metarag_core::error::exit_codes;
use metarag_core::MetaragError;
use std::io::Write;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        let _ = std::io::stdout().flush();
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<MetaragError>()
            .map(MetaragError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo(args) => commands::demo::run(args, &config, cli.format).await,
        Commands::Query(args) => commands::query::run(args, &config, cli.format).await,
        Commands::Filters(args) => commands::filters::run(args, &config, cli.format),
        Commands::Metadata(args) => commands::metadata::run(args, &config, cli.format).await,
    }
}
