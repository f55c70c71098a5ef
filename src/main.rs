// src/main.rs

mod api_client;
mod config;
mod congestion;
mod poller;
mod render;
mod router;
mod store;
mod tui;
mod types;

use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ConfigSource;
use crate::types::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let (config, source) = Config::load_or_default(&config_path);

    init_logging(&config)?;

    match &source {
        ConfigSource::File(path) => info!("✓ Configuration loaded from {}", path),
        ConfigSource::Defaults(reason) => {
            warn!("using default configuration ({})", reason)
        }
    }
    config.validate();

    info!(
        "🚦 lanewatch starting — server {}, live every {} ms, analytics every {} ms",
        config.server.base_url,
        config.polling.live_interval_ms,
        config.polling.analytics_interval_ms
    );

    tui::run(config).await
}

/// Logs go to a file: stdout is the dashboard's alternate screen.
fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.logging.file)
        .with_context(|| format!("cannot open log file {}", config.logging.file))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
