//! The `bunkmeter budget` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use bunkmeter_core::model::{AttendanceStatus, BunkBudget};
use bunkmeter_core::statistics::{bunk_budget, percentage, StatusBand};
use bunkmeter_sources::config::load_config_from;

use super::resolve_target;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetOutput {
    attended: u32,
    total: u32,
    percentage: f64,
    target_percent: f64,
    #[serde(flatten)]
    budget: BunkBudget,
}

pub fn execute(
    attended: u32,
    total: u32,
    target: Option<f64>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let target = resolve_target(target, None, &config)?;

    let budget = bunk_budget(attended, total, target);
    let pct = percentage(attended, total);

    if json {
        let output = BudgetOutput {
            attended,
            total,
            percentage: pct,
            target_percent: target.percent(),
            budget,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Attendance: {attended}/{total} ({pct:.2}%)");
    println!(
        "Status: {} ({})",
        budget.status,
        StatusBand::classify(pct, target)
    );
    match budget.status {
        _ if total == 0 => println!("No classes recorded yet."),
        AttendanceStatus::Safe => println!(
            "You can skip {} more class(es) and stay at or above {target}.",
            budget.skippable
        ),
        AttendanceStatus::Danger => println!(
            "Attend the next {} class(es) to reach {target}.",
            budget.must_attend
        ),
    }

    Ok(())
}
