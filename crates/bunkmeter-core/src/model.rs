//! Core data model types for bunkmeter.
//!
//! These are the value objects the rest of the system passes around:
//! raw subject counts coming in, computed per-subject and overall status
//! going out, and the attendance sheet that stores counts on disk.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw attendance counts for one subject, as produced by a source.
///
/// `attended <= total` is expected but not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Course code (e.g. "CS301").
    pub code: String,
    /// Human-readable subject name.
    pub name: String,
    /// Classes attended so far.
    pub attended: u32,
    /// Classes held so far.
    pub total: u32,
}

impl SubjectRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        attended: u32,
        total: u32,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            attended,
            total,
        }
    }
}

/// Whether an attendance ratio is at or above the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Safe,
    Danger,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Safe => write!(f, "Safe"),
            AttendanceStatus::Danger => write!(f, "Danger"),
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "safe" => Ok(AttendanceStatus::Safe),
            "danger" => Ok(AttendanceStatus::Danger),
            other => Err(format!("unknown attendance status: {other}")),
        }
    }
}

/// Result of the bunk-budget search for one pair of counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BunkBudget {
    /// Classes that can still be missed while staying at or above target.
    pub skippable: u32,
    /// Consecutive classes that must be attended to get back to target.
    pub must_attend: u32,
    pub status: AttendanceStatus,
}

/// A subject together with its computed statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStatus {
    #[serde(flatten)]
    pub subject: SubjectRecord,
    /// Attendance percentage rounded to two decimals (0 when no classes held).
    pub percentage: f64,
    pub skippable: u32,
    pub must_attend: u32,
    pub status: AttendanceStatus,
}

/// Aggregate statistics over every subject of one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStatus {
    pub attended: u64,
    pub total: u64,
    pub percentage: f64,
    pub skippable: u32,
    pub must_attend: u32,
    pub status: AttendanceStatus,
}

/// A single dated attendance entry in a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub date: NaiveDate,
    pub attended: bool,
    #[serde(default)]
    pub note: String,
}

/// A subject as stored in an attendance sheet: counts plus an optional log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSubject {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub attended: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub marks: Vec<AttendanceMark>,
}

impl SheetSubject {
    /// The raw counts, without the mark log.
    pub fn record(&self) -> SubjectRecord {
        SubjectRecord::new(&self.code, &self.name, self.attended, self.total)
    }
}

/// A locally maintained attendance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSheet {
    /// Student identifier (register number), if recorded.
    #[serde(default)]
    pub student: Option<String>,
    /// Per-sheet target override, in percent.
    #[serde(default)]
    pub target_percent: Option<f64>,
    #[serde(default)]
    pub subjects: Vec<SheetSubject>,
}

impl AttendanceSheet {
    /// Raw counts for every subject, in sheet order.
    pub fn records(&self) -> Vec<SubjectRecord> {
        self.subjects.iter().map(SheetSubject::record).collect()
    }

    /// Look a subject up by code (case-insensitive).
    pub fn subject(&self, code: &str) -> Option<&SheetSubject> {
        self.subjects
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_and_parse() {
        assert_eq!(AttendanceStatus::Safe.to_string(), "Safe");
        assert_eq!(AttendanceStatus::Danger.to_string(), "Danger");
        assert_eq!(
            "DANGER".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Danger
        );
        assert!("maybe".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn subject_status_serializes_flat_camel_case() {
        let status = SubjectStatus {
            subject: SubjectRecord::new("CS301", "Operating Systems", 30, 40),
            percentage: 75.0,
            skippable: 0,
            must_attend: 0,
            status: AttendanceStatus::Safe,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["code"], "CS301");
        assert_eq!(json["attended"], 30);
        assert_eq!(json["mustAttend"], 0);
        assert_eq!(json["status"], "Safe");
        assert!(json.get("subject").is_none());
    }

    #[test]
    fn sheet_lookup_ignores_case() {
        let sheet = AttendanceSheet {
            student: None,
            target_percent: None,
            subjects: vec![SheetSubject {
                code: "CS301".into(),
                name: "Operating Systems".into(),
                attended: 3,
                total: 4,
                marks: vec![],
            }],
        };
        assert!(sheet.subject("cs301").is_some());
        assert!(sheet.subject("MA201").is_none());
        assert_eq!(sheet.records()[0].total, 4);
    }
}
