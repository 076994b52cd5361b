//! The `bunkmeter fetch` command.

use std::path::PathBuf;

use anyhow::Result;

use bunkmeter_core::report::AttendanceReport;
use bunkmeter_sources::config::load_config_from;
use bunkmeter_sources::{create_source, SourceError};

use super::resolve_target;

pub async fn execute(
    register_number: Option<String>,
    format: Option<String>,
    target: Option<f64>,
    save: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(register_number) = register_number {
        config.remote.register_number = Some(register_number);
    }
    let target = resolve_target(target, None, &config)?;

    let source = create_source("remote", &config)?;
    eprintln!("Fetching attendance from {} ...", config.remote.base_url);
    let records = match source.fetch().await {
        Ok(records) => records,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<SourceError>() {
                if let Some(secs) = err.retry_after_secs() {
                    eprintln!("Try again in {} minute(s).", secs.div_ceil(60));
                } else if !err.is_permanent() {
                    eprintln!("This may be temporary; try again later.");
                }
            }
            return Err(e);
        }
    };

    let report = AttendanceReport::build(&records, target);
    let format = format.unwrap_or_else(|| config.output_format.clone());
    print!("{}", super::report::render(&report, target, &format)?);

    if let Some(path) = save {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}
