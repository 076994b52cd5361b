//! TOML attendance sheet parser.
//!
//! Loads attendance sheets from TOML files and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{AttendanceMark, AttendanceSheet, SheetSubject};

/// Intermediate TOML structure for parsing sheet files.
#[derive(Debug, Deserialize)]
struct TomlSheetFile {
    #[serde(default)]
    sheet: TomlSheetHeader,
    #[serde(default)]
    subjects: Vec<TomlSubject>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlSheetHeader {
    #[serde(default)]
    student: Option<String>,
    #[serde(default)]
    target_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TomlSubject {
    code: String,
    name: String,
    #[serde(default)]
    attended: u32,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    marks: Vec<TomlMark>,
}

#[derive(Debug, Deserialize)]
struct TomlMark {
    date: String,
    #[serde(default = "default_true")]
    attended: bool,
    #[serde(default)]
    note: String,
}

fn default_true() -> bool {
    true
}

/// Parse a single TOML file into an `AttendanceSheet`.
pub fn parse_sheet(path: &Path) -> Result<AttendanceSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read attendance sheet: {}", path.display()))?;

    parse_sheet_str(&content, path)
}

/// Parse a TOML string into an `AttendanceSheet` (useful for testing).
pub fn parse_sheet_str(content: &str, source_path: &Path) -> Result<AttendanceSheet> {
    let parsed: TomlSheetFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let subjects = parsed
        .subjects
        .into_iter()
        .map(|s| {
            let marks = s
                .marks
                .into_iter()
                .map(|m| {
                    let date = m.date.trim().parse::<NaiveDate>().with_context(|| {
                        format!("subject {}: invalid mark date '{}'", s.code, m.date)
                    })?;
                    Ok(AttendanceMark {
                        date,
                        attended: m.attended,
                        note: m.note,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(SheetSubject {
                code: s.code,
                name: s.name,
                attended: s.attended,
                total: s.total,
                marks,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AttendanceSheet {
        student: parsed.sheet.student,
        target_percent: parsed.sheet.target_percent,
        subjects,
    })
}

/// A warning from sheet validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The subject code (if applicable).
    pub code: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a sheet for common issues.
pub fn validate_sheet(sheet: &AttendanceSheet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(target) = sheet.target_percent {
        if !(target > 0.0 && target < 100.0) {
            warnings.push(ValidationWarning {
                code: None,
                message: format!("target_percent {target} is outside 0..100 and will be rejected"),
            });
        }
    }

    // Check for duplicate codes
    let mut seen = HashSet::new();
    for subject in &sheet.subjects {
        if !seen.insert(subject.code.to_ascii_uppercase()) {
            warnings.push(ValidationWarning {
                code: Some(subject.code.clone()),
                message: format!("duplicate subject code: {}", subject.code),
            });
        }
    }

    for subject in &sheet.subjects {
        let code = Some(subject.code.clone());

        if subject.code.trim().is_empty() {
            warnings.push(ValidationWarning {
                code: None,
                message: format!("subject '{}' has an empty code", subject.name),
            });
        }
        if subject.name.trim().is_empty() {
            warnings.push(ValidationWarning {
                code: code.clone(),
                message: "subject name is empty".into(),
            });
        }
        if subject.attended > subject.total {
            warnings.push(ValidationWarning {
                code: code.clone(),
                message: format!(
                    "attended ({}) exceeds total ({})",
                    subject.attended, subject.total
                ),
            });
        }
        if subject.total == 0 {
            warnings.push(ValidationWarning {
                code: code.clone(),
                message: "no classes recorded yet".into(),
            });
        }
        if subject.marks.len() > subject.total as usize {
            warnings.push(ValidationWarning {
                code,
                message: format!(
                    "{} marks recorded but total is {}",
                    subject.marks.len(),
                    subject.total
                ),
            });
        }
    }

    warnings
}
