//! The `bunkmeter validate` command.

use std::path::PathBuf;

use anyhow::Result;

use bunkmeter_core::parser::{parse_sheet, validate_sheet};
use bunkmeter_sources::config::load_config_from;

use super::sheet_path;

pub fn execute(sheet: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = sheet_path(sheet, &config);
    let sheet = parse_sheet(&path)?;

    match &sheet.student {
        Some(student) => println!(
            "Sheet: {} ({student}, {} subjects)",
            path.display(),
            sheet.subjects.len()
        ),
        None => println!("Sheet: {} ({} subjects)", path.display(), sheet.subjects.len()),
    }

    let warnings = validate_sheet(&sheet);
    for w in &warnings {
        let prefix = w
            .code
            .as_ref()
            .map(|code| format!("  [{code}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Sheet is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
