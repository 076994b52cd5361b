//! In-place edits of attendance sheet files.
//!
//! Edits go through `toml_edit` so that comments and layout in a
//! hand-maintained sheet survive every change.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use toml_edit::{ArrayOfTables, DocumentMut, Item, Table};

use crate::model::SubjectRecord;

fn load_document(path: &Path, create: bool) -> Result<DocumentMut> {
    if create && !path.exists() {
        return Ok(DocumentMut::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read attendance sheet: {}", path.display()))?;
    content
        .parse::<DocumentMut>()
        .with_context(|| format!("failed to parse TOML: {}", path.display()))
}

fn save_document(path: &Path, doc: &DocumentMut) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, doc.to_string())
        .with_context(|| format!("failed to write attendance sheet: {}", path.display()))
}

fn subjects_mut(doc: &mut DocumentMut) -> Result<&mut ArrayOfTables> {
    doc.as_table_mut()
        .entry("subjects")
        .or_insert(Item::ArrayOfTables(ArrayOfTables::new()))
        .as_array_of_tables_mut()
        .context("`subjects` must be an array of tables ([[subjects]])")
}

fn code_of(table: &Table) -> Option<&str> {
    table.get("code").and_then(Item::as_str)
}

fn count_of(table: &Table, key: &str) -> Result<u32> {
    match table.get(key) {
        None => Ok(0),
        Some(item) => {
            let n = item
                .as_integer()
                .with_context(|| format!("`{key}` must be an integer"))?;
            u32::try_from(n).with_context(|| format!("`{key}` out of range: {n}"))
        }
    }
}

fn record_of(table: &Table) -> Result<SubjectRecord> {
    Ok(SubjectRecord {
        code: code_of(table).unwrap_or_default().to_string(),
        name: table
            .get("name")
            .and_then(Item::as_str)
            .unwrap_or_default()
            .to_string(),
        attended: count_of(table, "attended")?,
        total: count_of(table, "total")?,
    })
}

fn find_subject<'a>(subjects: &'a mut ArrayOfTables, code: &str) -> Result<&'a mut Table> {
    subjects
        .iter_mut()
        .find(|t| code_of(t).is_some_and(|c| c.eq_ignore_ascii_case(code)))
        .with_context(|| format!("no subject with code {code}"))
}

fn set_counts_in(table: &mut Table, attended: u32, total: u32) {
    table.insert("attended", toml_edit::value(i64::from(attended)));
    table.insert("total", toml_edit::value(i64::from(total)));
}

fn subject_table(code: &str, name: &str, attended: u32, total: u32) -> Table {
    let mut table = Table::new();
    table.insert("code", toml_edit::value(code));
    table.insert("name", toml_edit::value(name));
    set_counts_in(&mut table, attended, total);
    table
}

/// Append a new subject with zero counts. The file is created if missing.
pub fn add_subject(path: &Path, code: &str, name: &str) -> Result<SubjectRecord> {
    let (code, name) = (code.trim(), name.trim());
    anyhow::ensure!(!code.is_empty(), "subject code must not be empty");
    anyhow::ensure!(!name.is_empty(), "subject name must not be empty");

    let mut doc = load_document(path, true)?;
    let subjects = subjects_mut(&mut doc)?;
    if find_subject(subjects, code).is_ok() {
        anyhow::bail!("subject {code} already exists in {}", path.display());
    }
    subjects.push(subject_table(code, name, 0, 0));

    save_document(path, &doc)?;
    tracing::debug!(code, "added subject");
    Ok(SubjectRecord::new(code, name, 0, 0))
}

/// Write a new sheet holding `records`, in order.
///
/// Everything is checked before the file is written: an existing file,
/// an empty or duplicate code, or `attended > total` leaves the disk untouched.
pub fn create_sheet(path: &Path, records: &[SubjectRecord]) -> Result<()> {
    anyhow::ensure!(!path.exists(), "{} already exists", path.display());

    let mut seen = HashSet::new();
    let mut subjects = ArrayOfTables::new();
    for r in records {
        let code = r.code.trim();
        anyhow::ensure!(!code.is_empty(), "subject '{}' has an empty code", r.name);
        anyhow::ensure!(
            seen.insert(code.to_ascii_uppercase()),
            "duplicate subject code: {code}"
        );
        anyhow::ensure!(
            r.attended <= r.total,
            "{code}: attended ({}) cannot exceed total ({})",
            r.attended,
            r.total
        );
        subjects.push(subject_table(code, r.name.trim(), r.attended, r.total));
    }

    let mut doc = DocumentMut::new();
    doc.insert("subjects", Item::ArrayOfTables(subjects));
    save_document(path, &doc)?;
    tracing::debug!(path = %path.display(), subjects = records.len(), "created sheet");
    Ok(())
}

/// Remove a subject and its marks.
pub fn remove_subject(path: &Path, code: &str) -> Result<SubjectRecord> {
    let mut doc = load_document(path, false)?;
    let subjects = subjects_mut(&mut doc)?;
    let index = subjects
        .iter()
        .position(|t| code_of(t).is_some_and(|c| c.eq_ignore_ascii_case(code)))
        .with_context(|| format!("no subject with code {code}"))?;

    let removed = subjects
        .get(index)
        .map(record_of)
        .transpose()?
        .with_context(|| format!("no subject with code {code}"))?;
    subjects.remove(index);

    save_document(path, &doc)?;
    tracing::debug!(code, "removed subject");
    Ok(removed)
}

/// Record one class for a subject: bumps `total` (and `attended` when
/// present) and appends a dated mark.
pub fn record_mark(
    path: &Path,
    code: &str,
    date: NaiveDate,
    attended: bool,
    note: Option<&str>,
) -> Result<SubjectRecord> {
    let mut doc = load_document(path, false)?;
    let subjects = subjects_mut(&mut doc)?;
    let table = find_subject(subjects, code)?;

    let current = record_of(table)?;
    let new_total = current
        .total
        .checked_add(1)
        .context("total class count overflow")?;
    let new_attended = if attended {
        current
            .attended
            .checked_add(1)
            .context("attended class count overflow")?
    } else {
        current.attended
    };
    set_counts_in(table, new_attended, new_total);

    let mut mark = Table::new();
    mark.insert("date", toml_edit::value(date.format("%Y-%m-%d").to_string()));
    mark.insert("attended", toml_edit::value(attended));
    if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
        mark.insert("note", toml_edit::value(note.trim()));
    }
    table
        .entry("marks")
        .or_insert(Item::ArrayOfTables(ArrayOfTables::new()))
        .as_array_of_tables_mut()
        .context("`marks` must be an array of tables ([[subjects.marks]])")?
        .push(mark);

    save_document(path, &doc)?;
    tracing::debug!(code, %date, attended, "recorded mark");
    Ok(SubjectRecord {
        attended: new_attended,
        total: new_total,
        ..current
    })
}

/// Overwrite a subject's counts, e.g. after checking them against the portal.
pub fn set_counts(path: &Path, code: &str, attended: u32, total: u32) -> Result<SubjectRecord> {
    anyhow::ensure!(
        attended <= total,
        "attended ({attended}) cannot exceed total ({total})"
    );

    let mut doc = load_document(path, false)?;
    let subjects = subjects_mut(&mut doc)?;
    let table = find_subject(subjects, code)?;
    set_counts_in(table, attended, total);
    let record = record_of(table)?;

    save_document(path, &doc)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sheet;

    const SHEET: &str = r#"# my semester
[sheet]
student = "21691A0501"

# core subjects
[[subjects]]
code = "CS301"
name = "Operating Systems"
attended = 30
total = 40
"#;

    fn sheet_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.toml");
        std::fs::write(&path, SHEET).unwrap();
        (dir, path)
    }

    #[test]
    fn add_subject_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.toml");

        add_subject(&path, "MA201", "Probability").unwrap();
        let sheet = parse_sheet(&path).unwrap();
        assert_eq!(sheet.subjects.len(), 1);
        assert_eq!(sheet.subjects[0].code, "MA201");
        assert_eq!(sheet.subjects[0].total, 0);
    }

    #[test]
    fn add_subject_rejects_duplicates() {
        let (_dir, path) = sheet_file();
        let err = add_subject(&path, "cs301", "Again").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        let err = add_subject(&path, " CS301 ", "Padded").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(parse_sheet(&path).unwrap().subjects.len(), 1);
    }

    #[test]
    fn create_sheet_writes_all_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imported.toml");
        let records = vec![
            SubjectRecord::new("20CS301", "Operating Systems", 30, 40),
            SubjectRecord::new("20MA201", "Probability", 10, 20),
        ];

        create_sheet(&path, &records).unwrap();
        assert_eq!(parse_sheet(&path).unwrap().records(), records);

        let err = create_sheet(&path, &records).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn create_sheet_leaves_nothing_behind_on_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imported.toml");
        let records = vec![
            SubjectRecord::new("SOFT S", "Soft Skills", 8, 10),
            SubjectRecord::new("soft s", "Soft Skills Lab", 4, 5),
        ];

        let err = create_sheet(&path, &records).unwrap_err();
        assert!(err.to_string().contains("duplicate subject code"));
        assert!(!path.exists());
    }

    #[test]
    fn record_mark_updates_counts_and_keeps_comments() {
        let (_dir, path) = sheet_file();
        let date = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();

        let record = record_mark(&path, "CS301", date, false, Some("fever")).unwrap();
        assert_eq!((record.attended, record.total), (30, 41));

        let record = record_mark(&path, "cs301", date, true, None).unwrap();
        assert_eq!((record.attended, record.total), (31, 42));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# my semester"));
        assert!(content.contains("# core subjects"));

        let sheet = parse_sheet(&path).unwrap();
        let subject = &sheet.subjects[0];
        assert_eq!(subject.marks.len(), 2);
        assert_eq!(subject.marks[0].note, "fever");
        assert!(!subject.marks[0].attended);
        assert!(subject.marks[1].attended);
    }

    #[test]
    fn record_mark_unknown_subject() {
        let (_dir, path) = sheet_file();
        let date = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        assert!(record_mark(&path, "XX999", date, true, None).is_err());
    }

    #[test]
    fn set_counts_validates() {
        let (_dir, path) = sheet_file();
        assert!(set_counts(&path, "CS301", 50, 40).is_err());

        let record = set_counts(&path, "CS301", 33, 44).unwrap();
        assert_eq!((record.attended, record.total), (33, 44));
        assert_eq!(parse_sheet(&path).unwrap().subjects[0].attended, 33);
    }

    #[test]
    fn remove_subject_drops_it() {
        let (_dir, path) = sheet_file();
        add_subject(&path, "MA201", "Probability").unwrap();

        let removed = remove_subject(&path, "CS301").unwrap();
        assert_eq!(removed.name, "Operating Systems");

        let sheet = parse_sheet(&path).unwrap();
        assert_eq!(sheet.subjects.len(), 1);
        assert_eq!(sheet.subjects[0].code, "MA201");
        assert!(remove_subject(&path, "CS301").is_err());
    }
}
