pub mod budget;
pub mod fetch;
pub mod health;
pub mod import;
pub mod init;
pub mod report;
pub mod subject;
pub mod validate;
pub mod what_if;

use std::path::PathBuf;

use anyhow::{Context, Result};

use bunkmeter_core::statistics::Target;
use bunkmeter_sources::config::BunkmeterConfig;

/// The sheet named on the command line, or the configured one.
pub fn sheet_path(flag: Option<PathBuf>, config: &BunkmeterConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.sheet.clone())
}

/// `--target` wins over the sheet's own target, which wins over the config.
pub fn resolve_target(
    flag: Option<f64>,
    sheet_target: Option<f64>,
    config: &BunkmeterConfig,
) -> Result<Target> {
    match flag.or(sheet_target) {
        Some(percent) => Target::from_percent(percent)
            .with_context(|| format!("invalid target percentage: {percent}")),
        None => config.target(),
    }
}
