//! The `bunkmeter health` command.

use std::path::PathBuf;

use anyhow::Result;

use bunkmeter_sources::config::load_config_from;
use bunkmeter_sources::RemoteSource;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let source =
        RemoteSource::anonymous(&config.remote.base_url).with_timeout(config.remote.timeout_secs);

    let health = source.health().await?;
    println!("Backend: {}", config.remote.base_url);
    println!("Status: {}", health.status);
    if let Some(environment) = &health.environment {
        println!("Environment: {environment}");
    }
    if let Some(timestamp) = &health.timestamp {
        println!("Timestamp: {timestamp}");
    }

    Ok(())
}
