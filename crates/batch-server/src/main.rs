//! Batch server - Main entry point

use anyhow::Result;
use batch_common::logging::{init_logging, LogConfig};
use tracing::info;

use batch_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("batch-server")
        .filter_directives("batch_server=debug,tower_http=debug,rdkafka=info")
        .build()
        .merge_env()?;

    init_logging(&log_config)?;

    info!("Starting batch server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
