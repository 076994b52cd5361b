//! Import attendance rows from text copied off the student portal.
//!
//! The portal renders its attendance table in a few different shapes
//! depending on the page version and how it was copied. Row splitting is
//! an ordered list of strategies; the first one that produces a valid
//! subject row wins.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::SubjectRecord;

/// Errors raised while importing pasted portal text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// No row in the text looked like an attendance row.
    #[error("no attendance data found; the page structure may have changed")]
    NoRows,
}

const UNKNOWN_SUBJECT: &str = "Unknown Subject";

/// One way of cutting pasted text into rows of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStrategy {
    /// Blank-line separated blocks, one cell per line.
    Blocks,
    /// One row per line, cells separated by tabs.
    Tabs,
    /// One row per line, cells separated by `|`.
    Pipes,
    /// One row per line, cells separated by two or more spaces.
    Spaces,
}

impl RowStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [RowStrategy; 4] = [
        RowStrategy::Blocks,
        RowStrategy::Tabs,
        RowStrategy::Pipes,
        RowStrategy::Spaces,
    ];

    /// Cut `text` into candidate rows.
    pub fn rows(self, text: &str) -> Vec<Vec<String>> {
        match self {
            RowStrategy::Blocks => blocks(text),
            RowStrategy::Tabs => per_line(text, |line| split_on(line, '\t')),
            RowStrategy::Pipes => per_line(text, |line| split_on(line, '|')),
            RowStrategy::Spaces => per_line(text, split_on_space_runs),
        }
    }
}

fn clean(cells: impl IntoIterator<Item = String>) -> Vec<String> {
    cells
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn blocks(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                rows.push(clean(std::mem::take(&mut current)));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        rows.push(clean(current));
    }
    rows
}

fn split_on(line: &str, separator: char) -> Vec<String> {
    line.split(separator).map(str::to_string).collect()
}

fn per_line(text: &str, split: impl Fn(&str) -> Vec<String>) -> Vec<Vec<String>> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| clean(split(l)))
        .collect()
}

fn split_on_space_runs(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0usize;
    for ch in line.chars() {
        if ch == ' ' {
            spaces += 1;
            continue;
        }
        if spaces >= 2 {
            cells.push(std::mem::take(&mut current));
        } else if spaces == 1 && !current.is_empty() {
            current.push(' ');
        }
        spaces = 0;
        current.push(ch);
    }
    cells.push(current);
    cells
}

/// Parse a count cell. The portal occasionally renders counts as `12.0`.
fn parse_count(cell: &str) -> Option<u32> {
    let value: f64 = cell.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_percent(cell: &str) -> Option<f64> {
    cell.replace('%', "").trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Find a course code in `s`: two or more digits followed by at least two
/// more uppercase letters or digits, taking the longest such run from the
/// leftmost start. Returns the byte range.
fn find_course_code(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let is_code_char = |b: u8| b.is_ascii_digit() || b.is_ascii_uppercase();

    for start in 0..bytes.len() {
        if start + 1 >= bytes.len() {
            break;
        }
        if !(bytes[start].is_ascii_digit() && bytes[start + 1].is_ascii_digit()) {
            continue;
        }
        let end = bytes[start..]
            .iter()
            .position(|&b| !is_code_char(b))
            .map_or(bytes.len(), |p| start + p);
        if end - start >= 4 {
            return Some((start, end));
        }
    }
    None
}

/// Split the cells between the serial number and the statistics into a
/// course code and a subject name.
fn code_and_name(parts: &[String]) -> (String, String) {
    let (code, name) = match parts {
        [] => (String::new(), UNKNOWN_SUBJECT.to_string()),
        [single] => match find_course_code(single) {
            Some((s, e)) => {
                let code = single[s..e].to_string();
                let rest = format!("{}{}", &single[..s], &single[e..]);
                let rest = rest.trim();
                let name = if rest.chars().count() > 2 {
                    rest.to_string()
                } else {
                    single.clone()
                };
                (code, name)
            }
            None => (String::new(), single.clone()),
        },
        many => match many
            .iter()
            .enumerate()
            .find_map(|(i, p)| find_course_code(p).map(|r| (i, r)))
        {
            Some((index, (s, e))) => {
                let cell = &many[index];
                let code = cell[s..e].to_string();
                let rest = format!("{}{}", &cell[..s], &cell[e..]);
                let rest = rest.trim();
                let others = many
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, p)| p.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let name = if rest.chars().count() > 2 {
                    format!("{rest} {others}").trim().to_string()
                } else {
                    others
                };
                (code, name)
            }
            None => (String::new(), many.join(" ")),
        },
    };

    let name = if name.trim().is_empty() {
        UNKNOWN_SUBJECT.to_string()
    } else {
        name
    };
    let code = if code.is_empty() {
        name.chars().take(6).collect::<String>().to_uppercase()
    } else {
        code
    };
    (code, name)
}

/// Turn one row of cells into a subject record, if it is an attendance row.
///
/// A row must start with an all-digit serial number and end (possibly
/// followed by trailing cells) with `attended, total, percentage` where
/// `attended <= total`.
pub fn parse_row(cells: &[String]) -> Option<SubjectRecord> {
    if cells.len() < 4 {
        return None;
    }
    if !cells[0].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let stats_start = (2..cells.len()).rev().find_map(|i| {
        let _percent = parse_percent(&cells[i])?;
        let total = parse_count(&cells[i - 1])?;
        let attended = parse_count(&cells[i - 2])?;
        (attended <= total).then_some((i - 2, attended, total))
    });
    let (start, attended, total) = stats_start?;
    if start < 1 {
        return None;
    }

    let (code, name) = code_and_name(&cells[1..start]);
    Some(SubjectRecord {
        code,
        name,
        attended,
        total,
    })
}

/// Extract subject records from pasted portal text.
pub fn import_rows(text: &str) -> Result<Vec<SubjectRecord>, ImportError> {
    for strategy in RowStrategy::ORDER {
        let records: Vec<SubjectRecord> = strategy
            .rows(text)
            .iter()
            .filter_map(|row| parse_row(row))
            .collect();
        if !records.is_empty() {
            tracing::debug!(?strategy, rows = records.len(), "imported attendance rows");
            return Ok(records);
        }
        tracing::debug!(?strategy, "no attendance rows with this strategy");
    }
    Err(ImportError::NoRows)
}

/// Give repeated codes a `-2`, `-3`, ... suffix so every record can live in
/// one sheet. Theory and lab rows often share a portal code, and fallback
/// codes collide whenever two names share their first six characters.
///
/// Returns the number of records that were renamed.
pub fn disambiguate_codes(records: &mut [SubjectRecord]) -> usize {
    let mut taken: HashSet<String> = HashSet::new();
    let mut renamed = 0;
    for record in records.iter_mut() {
        if taken.insert(record.code.to_ascii_uppercase()) {
            continue;
        }
        let base = record.code.clone();
        let mut n = 2;
        let code = loop {
            let candidate = format!("{base}-{n}");
            if taken.insert(candidate.to_ascii_uppercase()) {
                break candidate;
            }
            n += 1;
        };
        tracing::debug!(from = %base, to = %code, "renamed duplicate subject code");
        record.code = code;
        renamed += 1;
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn course_code_detection() {
        assert_eq!(find_course_code("20CS301 Operating Systems"), Some((0, 7)));
        assert_eq!(find_course_code("Lab X21CS3L1"), Some((5, 12)));
        assert_eq!(find_course_code("Operating Systems"), None);
        // Two digits but too short a run.
        assert_eq!(find_course_code("12A"), None);
        assert_eq!(find_course_code("Room 12"), None);
    }

    #[test]
    fn row_with_code_in_name_cell() {
        let row = cells(&["1", "20CS301 Operating Systems", "30", "40", "75.00%"]);
        let record = parse_row(&row).unwrap();
        assert_eq!(record.code, "20CS301");
        assert_eq!(record.name, "Operating Systems");
        assert_eq!((record.attended, record.total), (30, 40));
    }

    #[test]
    fn row_with_separate_code_cell() {
        let row = cells(&["2", "20MA201", "Probability", "and Statistics", "12", "20", "60"]);
        let record = parse_row(&row).unwrap();
        assert_eq!(record.code, "20MA201");
        assert_eq!(record.name, "Probability and Statistics");
        assert_eq!((record.attended, record.total), (12, 20));
    }

    #[test]
    fn row_without_code_falls_back_to_name_prefix() {
        let row = cells(&["3", "Soft Skills", "5", "6", "83.33"]);
        let record = parse_row(&row).unwrap();
        assert_eq!(record.code, "SOFT S");
        assert_eq!(record.name, "Soft Skills");
    }

    #[test]
    fn rejects_rows_that_are_not_attendance() {
        assert!(parse_row(&cells(&["S.NO", "Subject", "Attended", "Total", "%"])).is_none());
        assert!(parse_row(&cells(&["1", "Physics", "40"])).is_none());
        // attended > total fails the semantic check
        assert!(parse_row(&cells(&["1", "Physics", "50", "40", "125"])).is_none());
    }

    #[test]
    fn trailing_cells_after_stats() {
        let row = cells(&["1", "20CS301 Operating Systems", "30", "40", "75%", "Eligible"]);
        let record = parse_row(&row).unwrap();
        assert_eq!((record.attended, record.total), (30, 40));
        assert_eq!(record.code, "20CS301");
    }

    #[test]
    fn import_tab_separated() {
        let text = "S.NO\tSUBJECT\tATTENDED\tTOTAL\tPERCENTAGE\n\
                    1\t20CS301 Operating Systems\t30\t40\t75.00\n\
                    2\t20MA201 Probability\t10\t20\t50.00\n";
        let records = import_rows(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].code, "20MA201");
        assert_eq!(records[1].attended, 10);
    }

    #[test]
    fn import_blocks() {
        let text = "S.NO\nSUBJECT\nATTENDED\nTOTAL\n%\n\n\
                    1\n20CS301\nOperating Systems\n30\n40\n75%\n\n\
                    2\nSoft Skills\n5\n6\n83.33%\n";
        let records = import_rows(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Operating Systems");
        assert_eq!(records[1].code, "SOFT S");
    }

    #[test]
    fn import_pipes_and_spaces() {
        let piped = "| 1 | 20CS301 Operating Systems | 30 | 40 | 75 |";
        assert_eq!(import_rows(piped).unwrap()[0].total, 40);

        let spaced = "1   20CS301 Operating Systems   30   40   75.00";
        let records = import_rows(spaced).unwrap();
        assert_eq!(records[0].name, "Operating Systems");
    }

    #[test]
    fn import_nothing() {
        assert_eq!(import_rows("Login failed"), Err(ImportError::NoRows));
        assert_eq!(import_rows(""), Err(ImportError::NoRows));
    }

    #[test]
    fn duplicate_codes_get_suffixes() {
        let mut records = vec![
            SubjectRecord::new("SOFT S", "Soft Skills", 8, 10),
            SubjectRecord::new("SOFT S", "Soft Skills Lab", 4, 5),
            SubjectRecord::new("20CS301", "Operating Systems", 30, 40),
            SubjectRecord::new("soft s", "Soft Skills Tutorial", 1, 1),
        ];
        assert_eq!(disambiguate_codes(&mut records), 2);
        let codes: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["SOFT S", "SOFT S-2", "20CS301", "soft s-3"]);
    }
}
