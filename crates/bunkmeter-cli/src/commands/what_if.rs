//! The `bunkmeter what-if` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use bunkmeter_core::parser::parse_sheet;
use bunkmeter_core::statistics::{compute_overall, percentage, project};
use bunkmeter_sources::config::load_config_from;

use super::{resolve_target, sheet_path};

pub fn execute(
    sheet: Option<PathBuf>,
    subject: Option<String>,
    attend: u32,
    skip: u32,
    target: Option<f64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = sheet_path(sheet, &config);
    let sheet = parse_sheet(&path)?;
    let target = resolve_target(target, sheet.target_percent, &config)?;

    let (label, attended, total) = match &subject {
        Some(code) => {
            let s = sheet
                .subject(code)
                .with_context(|| format!("no subject with code {code} in {}", path.display()))?;
            (format!("{} ({})", s.code, s.name), s.attended, s.total)
        }
        None => {
            let overall = compute_overall(&sheet.records(), target);
            let attended = u32::try_from(overall.attended)
                .context("overall attended count is too large to project")?;
            let total = u32::try_from(overall.total)
                .context("overall total count is too large to project")?;
            ("Overall".to_string(), attended, total)
        }
    };

    let projection = project(attended, total, attend, skip, target);

    println!("{label}: attend {attend}, skip {skip}");
    println!(
        "  now:   {attended}/{total} ({:.2}%)",
        percentage(attended, total)
    );
    println!(
        "  after: {}/{} ({:.2}%, {:+.2} pts) {}",
        projection.attended,
        projection.total,
        projection.percentage,
        projection.delta,
        projection.status
    );

    Ok(())
}
