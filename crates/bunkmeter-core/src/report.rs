//! Attendance report envelope with JSON persistence and text renderings.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AttendanceStatus, OverallStatus, SubjectRecord, SubjectStatus};
use crate::statistics::{compute_overall, compute_subject_statuses, Target};

/// The response envelope handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub success: bool,
    pub overall: OverallStatus,
    pub subjects: Vec<SubjectStatus>,
    pub summary: ReportSummary,
    /// When the report was computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Short summary of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_subjects: usize,
    pub overall_percentage: f64,
    pub status: AttendanceStatus,
}

impl AttendanceReport {
    /// Compute per-subject and overall statistics for one fetch.
    pub fn build(subjects: &[SubjectRecord], target: Target) -> Self {
        let statuses = compute_subject_statuses(subjects, target);
        let overall = compute_overall(subjects, target);
        let summary = ReportSummary {
            total_subjects: statuses.len(),
            overall_percentage: overall.percentage,
            status: overall.status,
        };

        Self {
            success: true,
            overall,
            subjects: statuses,
            summary,
            generated_at: Some(Utc::now()),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttendanceReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Subjects currently below target.
    pub fn in_danger(&self) -> impl Iterator<Item = &SubjectStatus> {
        self.subjects
            .iter()
            .filter(|s| s.status == AttendanceStatus::Danger)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Overall:** {}/{} classes, {:.2}% ({})\n\n",
            self.overall.attended, self.overall.total, self.overall.percentage, self.overall.status
        ));
        if self.overall.status == AttendanceStatus::Safe {
            md.push_str(&format!(
                "You can skip **{}** more class(es).\n\n",
                self.overall.skippable
            ));
        } else {
            md.push_str(&format!(
                "Attend the next **{}** class(es) to get back on target.\n\n",
                self.overall.must_attend
            ));
        }

        if !self.subjects.is_empty() {
            md.push_str("| Code | Subject | Attended | Total | % | Skippable | Must attend | Status |\n");
            md.push_str("|------|---------|----------|-------|---|-----------|-------------|--------|\n");
            for s in &self.subjects {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {:.2} | {} | {} | {} |\n",
                    s.subject.code,
                    s.subject.name,
                    s.subject.attended,
                    s.subject.total,
                    s.percentage,
                    s.skippable,
                    s.must_attend,
                    s.status
                ));
            }
        }

        md
    }

    /// Format the per-subject rows as CSV, with a header line.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        for s in &self.subjects {
            csv.push_str(&format!(
                "{},{},{},{},{:.2},{},{},{}\n",
                csv_field(&s.subject.code),
                csv_field(&s.subject.name),
                s.subject.attended,
                s.subject.total,
                s.percentage,
                s.skippable,
                s.must_attend,
                s.status
            ));
        }
        csv
    }
}

const CSV_HEADER: &str = "code,name,attended,total,percentage,skippable,must_attend,status\n";

fn csv_field(value: &str) -> String {
    if value.contains(|c| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AttendanceReport {
        AttendanceReport::build(
            &[
                SubjectRecord::new("CS301", "Operating Systems", 8, 10),
                SubjectRecord::new("MA201", "Probability, Statistics", 5, 10),
            ],
            Target::default(),
        )
    }

    #[test]
    fn build_envelope() {
        let report = sample();
        assert!(report.success);
        assert_eq!(report.overall.attended, 13);
        assert_eq!(report.overall.total, 20);
        assert_eq!(report.summary.total_subjects, 2);
        assert_eq!(report.summary.overall_percentage, 65.0);
        assert_eq!(report.summary.status, AttendanceStatus::Danger);
        assert_eq!(report.in_danger().count(), 1);
    }

    #[test]
    fn empty_envelope() {
        let report = AttendanceReport::build(&[], Target::default());
        assert!(report.subjects.is_empty());
        assert_eq!(report.summary.total_subjects, 0);
        assert_eq!(report.overall.percentage, 0.0);
    }

    #[test]
    fn json_wire_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["summary"]["totalSubjects"], 2);
        assert_eq!(json["summary"]["overallPercentage"], 65.0);
        assert_eq!(json["overall"]["mustAttend"], 8);
        assert_eq!(json["subjects"][0]["code"], "CS301");
        assert!(json.get("generatedAt").is_some());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/latest.json");
        let report = sample();
        report.save_json(&path).unwrap();

        let loaded = AttendanceReport::load_json(&path).unwrap();
        assert_eq!(loaded.subjects.len(), 2);
        assert_eq!(loaded.overall, report.overall);
    }

    #[test]
    fn load_backend_response_without_timestamp() {
        let body = r#"{
            "success": true,
            "overall": {"attended": 30, "total": 40, "percentage": 75, "skippable": 0, "mustAttend": 0, "status": "Safe"},
            "subjects": [{"code": "CS301", "name": "OS", "attended": 30, "total": 40, "percentage": 75, "skippable": 0, "mustAttend": 0, "status": "Safe"}],
            "summary": {"totalSubjects": 1, "overallPercentage": 75, "status": "Safe"}
        }"#;
        let report: AttendanceReport = serde_json::from_str(body).unwrap();
        assert!(report.generated_at.is_none());
        assert_eq!(report.subjects[0].subject.code, "CS301");
    }

    #[test]
    fn markdown_and_csv() {
        let report = sample();
        let md = report.to_markdown();
        assert!(md.contains("13/20"));
        assert!(md.contains("Attend the next **8**"));
        assert!(md.contains("| CS301 | Operating Systems | 8 | 10 | 80.00 |"));

        let csv = report.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("MA201,\"Probability, Statistics\",5,10,50.00"));
    }
}
