//! Sheet editing commands: `subject add|remove`, `mark`, `set`.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use bunkmeter_core::sheet;
use bunkmeter_core::statistics::percentage;
use bunkmeter_sources::config::load_config_from;

use super::sheet_path;

pub fn add(
    code: String,
    name: String,
    sheet: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = sheet_path(sheet, &config);
    let record = sheet::add_subject(&path, &code, &name)?;
    println!("Added {} ({}) to {}", record.code, record.name, path.display());
    Ok(())
}

pub fn remove(code: String, sheet: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = sheet_path(sheet, &config);
    let record = sheet::remove_subject(&path, &code)?;
    println!(
        "Removed {} ({}) from {}",
        record.code,
        record.name,
        path.display()
    );
    Ok(())
}

pub fn mark(
    code: String,
    attended: bool,
    date: Option<NaiveDate>,
    note: Option<String>,
    sheet: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = sheet_path(sheet, &config);
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    let record = sheet::record_mark(&path, &code, date, attended, note.as_deref())?;
    println!(
        "{} {} on {date}: now {}/{} ({:.2}%)",
        record.code,
        if attended { "attended" } else { "missed" },
        record.attended,
        record.total,
        percentage(record.attended, record.total)
    );
    Ok(())
}

pub fn set(
    code: String,
    attended: u32,
    total: u32,
    sheet: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = sheet_path(sheet, &config);
    let record = sheet::set_counts(&path, &code, attended, total)?;
    println!(
        "{}: {}/{} ({:.2}%)",
        record.code,
        record.attended,
        record.total,
        percentage(record.attended, record.total)
    );
    Ok(())
}
