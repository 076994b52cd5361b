//! The `bunkmeter report` command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};

use bunkmeter_core::model::AttendanceStatus;
use bunkmeter_core::parser::parse_sheet;
use bunkmeter_core::report::AttendanceReport;
use bunkmeter_core::statistics::{StatusBand, Target};
use bunkmeter_sources::config::load_config_from;

use super::{resolve_target, sheet_path};

#[derive(Args)]
pub struct ReportArgs {
    /// Attendance sheet (defaults to the configured sheet)
    #[arg(long, conflicts_with = "from_json")]
    pub sheet: Option<PathBuf>,

    /// Render a report saved by `fetch --save` instead of reading a sheet
    #[arg(long)]
    pub from_json: Option<PathBuf>,

    /// Only list subjects with this status: safe or danger
    #[arg(long)]
    pub only: Option<AttendanceStatus>,

    /// Output format: table, json, markdown, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Target percentage (e.g. 75)
    #[arg(long)]
    pub target: Option<f64>,

    /// Write the rendered report to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit code 1 if overall attendance is below target
    #[arg(long)]
    pub fail_on_danger: bool,
}

pub fn execute(args: ReportArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let (mut report, target) = match args.from_json {
        // A saved report keeps its own figures; the target only drives the bands.
        Some(json) => (
            AttendanceReport::load_json(&json)?,
            resolve_target(args.target, None, &config)?,
        ),
        None => {
            let path = sheet_path(args.sheet, &config);
            let sheet = parse_sheet(&path)?;
            let target = resolve_target(args.target, sheet.target_percent, &config)?;
            (AttendanceReport::build(&sheet.records(), target), target)
        }
    };
    if let Some(status) = args.only {
        report.subjects.retain(|s| s.status == status);
    }

    let format = args.format.unwrap_or_else(|| config.output_format.clone());
    let rendered = render(&report, target, &format)?;

    match args.output {
        Some(out) => {
            std::fs::write(&out, &rendered)?;
            eprintln!("Report written to: {}", out.display());
        }
        None => print!("{rendered}"),
    }

    if args.fail_on_danger && report.overall.status == AttendanceStatus::Danger {
        std::process::exit(1);
    }

    Ok(())
}

/// Render a report in one of the supported output formats.
pub fn render(report: &AttendanceReport, target: Target, format: &str) -> Result<String> {
    let rendered = match format {
        "table" | "text" => render_table(report, target),
        "json" => format!("{}\n", serde_json::to_string_pretty(report)?),
        "markdown" | "md" => report.to_markdown(),
        "csv" => report.to_csv(),
        other => anyhow::bail!("unknown format: {other} (expected table, json, markdown or csv)"),
    };
    Ok(rendered)
}

fn render_table(report: &AttendanceReport, target: Target) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Code",
        "Subject",
        "Attended",
        "Total",
        "%",
        "Status",
        "Band",
        "Can skip",
        "Must attend",
    ]);

    for s in &report.subjects {
        table.add_row(vec![
            Cell::new(&s.subject.code),
            Cell::new(&s.subject.name),
            Cell::new(s.subject.attended),
            Cell::new(s.subject.total),
            Cell::new(format!("{:.2}", s.percentage)),
            Cell::new(s.status),
            Cell::new(StatusBand::classify(s.percentage, target)),
            Cell::new(s.skippable),
            Cell::new(s.must_attend),
        ]);
    }

    let overall = &report.overall;
    table.add_row(vec![
        Cell::new("ALL"),
        Cell::new("Overall"),
        Cell::new(overall.attended),
        Cell::new(overall.total),
        Cell::new(format!("{:.2}", overall.percentage)),
        Cell::new(overall.status),
        Cell::new(StatusBand::classify(overall.percentage, target)),
        Cell::new(overall.skippable),
        Cell::new(overall.must_attend),
    ]);

    let mut out = format!("Target: {target}\n{table}\n");
    for s in report.in_danger().filter(|s| s.must_attend > 0) {
        out.push_str(&format!(
            "  {} ({}): attend the next {} class(es) to reach {target}\n",
            s.subject.code, s.subject.name, s.must_attend
        ));
    }
    out
}
