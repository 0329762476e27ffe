//! Batch CLI Library
//!
//! Command-line client for the batch ingestion API.
//!
//! - **Models**: `batch model list | describe | create | update | delete`
//! - **Jobs**: `batch job list | create | status | cancel | rejected`
//!
//! Every subcommand calls one HTTP endpoint and prints the response body.

pub mod api;
pub mod commands;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Batch ingestion CLI
#[derive(Parser, Debug)]
#[command(name = "batch")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Batch ingestion API URL
    #[arg(long, env = "BATCH_API_URL", default_value = api::client::DEFAULT_API_URL, global = true)]
    pub api: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Model operations
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },

    /// Job operations
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
}

/// Model subcommands
#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// List models
    List,

    /// Describe a model
    Describe { model_id: String },

    /// Create a model from a JSON schema file
    Create {
        name: String,
        schema_file: PathBuf,
    },

    /// Replace a model's schema
    Update {
        model_id: String,
        schema_file: PathBuf,
    },

    /// Delete a model
    Delete { model_id: String },
}

/// Job subcommands
#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// List jobs
    List,

    /// Upload a CSV or Parquet file for a model
    Create { model_id: String, file: PathBuf },

    /// Job status
    Status { job_id: String },

    /// Cancel a job
    Cancel { job_id: String },

    /// List rejected rows
    Rejected { job_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_job_create() {
        let cli = Cli::try_parse_from([
            "batch",
            "--api",
            "http://example.test:9000",
            "job",
            "create",
            "m1",
            "rows.csv",
        ])
        .unwrap();

        assert_eq!(cli.api, "http://example.test:9000");
        match cli.command {
            Commands::Job {
                command: JobCommand::Create { model_id, file },
            } => {
                assert_eq!(model_id, "m1");
                assert_eq!(file, PathBuf::from("rows.csv"));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_model_create_requires_schema_file() {
        assert!(Cli::try_parse_from(["batch", "model", "create", "orders"]).is_err());
    }
}
