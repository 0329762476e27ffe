//! Batch CLI - Main entry point

use batch_cli::{Cli, Commands};
use batch_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // `.env` may carry BATCH_API_URL; clap reads it from the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Debug logging only with --verbose
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("batch-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> batch_cli::Result<()> {
    match &cli.command {
        Commands::Model { command } => batch_cli::commands::model::run(&cli.api, command).await,
        Commands::Job { command } => batch_cli::commands::job::run(&cli.api, command).await,
    }
}
