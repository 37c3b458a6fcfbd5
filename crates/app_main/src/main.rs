//! FileDeck - headless file manager front end
//!
//! Loads the configuration and stored state, applies the requests given on
//! the command line and prints the resulting folder view.

mod app;

use anyhow::Result;
use app_core::{AppConfig, AppState};
use app_log::LogOptions;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_default();

    // Initialize logging and panic hook before anything else can fail
    let _log_guard = app_log::init(LogOptions {
        default_filter: config.general.log_level.clone(),
        directory: config.general.log_to_file.then(app_log::log_dir),
        console: cfg!(debug_assertions),
    })?;

    if let Err(e) = app_log::cleanup_old_logs(config.general.log_retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("FileDeck starting...");

    let args = app::Args::parse(std::env::args().skip(1))?;

    // Initialize application state
    let mut state = AppState::open(config)?;

    app::run(&mut state, args).await
}
