//! bunkmeter CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bunkmeter", version, about = "How many classes can you skip?")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the attendance report for a sheet
    Report(commands::report::ReportArgs),

    /// One-shot bunk budget for a pair of counts
    Budget {
        /// Classes attended
        attended: u32,

        /// Classes held
        total: u32,

        /// Target percentage (e.g. 75)
        #[arg(long)]
        target: Option<f64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Project attending or skipping the next few classes
    WhatIf {
        #[arg(long)]
        sheet: Option<PathBuf>,

        /// Limit the projection to one subject (defaults to overall)
        #[arg(long)]
        subject: Option<String>,

        /// Classes to attend
        #[arg(long, default_value = "0")]
        attend: u32,

        /// Classes to skip
        #[arg(long, default_value = "0")]
        skip: u32,

        #[arg(long)]
        target: Option<f64>,
    },

    /// Check an attendance sheet for problems
    Validate {
        #[arg(long)]
        sheet: Option<PathBuf>,
    },

    /// Convert text copied from the portal's attendance table into a sheet
    Import {
        /// File with the pasted text, or "-" for stdin
        input: PathBuf,

        /// Sheet to create (prints the parsed rows when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fetch attendance through the scraping backend
    Fetch {
        /// Register number (overrides config and BUNKMETER_REGISTER_NUMBER)
        #[arg(long)]
        register_number: Option<String>,

        /// Output format: table, json, markdown, csv
        #[arg(long)]
        format: Option<String>,

        #[arg(long)]
        target: Option<f64>,

        /// Save the JSON report to a file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Check that the scraping backend is up
    Health,

    /// Add or remove subjects in a sheet
    Subject {
        #[command(subcommand)]
        action: SubjectAction,
    },

    /// Record one class for a subject
    Mark {
        /// Subject code
        code: String,

        /// The class was missed
        #[arg(long)]
        absent: bool,

        /// Class date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        note: Option<String>,

        #[arg(long)]
        sheet: Option<PathBuf>,
    },

    /// Overwrite a subject's counts
    Set {
        /// Subject code
        code: String,

        attended: u32,

        total: u32,

        #[arg(long)]
        sheet: Option<PathBuf>,
    },

    /// Create starter config and attendance sheet
    Init,
}

#[derive(Subcommand)]
enum SubjectAction {
    /// Add a subject with zero counts
    Add {
        code: String,
        name: String,
        #[arg(long)]
        sheet: Option<PathBuf>,
    },
    /// Remove a subject
    Remove {
        code: String,
        #[arg(long)]
        sheet: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bunkmeter=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Report(args) => commands::report::execute(args, config),
        Commands::Budget {
            attended,
            total,
            target,
            json,
        } => commands::budget::execute(attended, total, target, json, config),
        Commands::WhatIf {
            sheet,
            subject,
            attend,
            skip,
            target,
        } => commands::what_if::execute(sheet, subject, attend, skip, target, config),
        Commands::Validate { sheet } => commands::validate::execute(sheet, config),
        Commands::Import { input, output } => commands::import::execute(input, output),
        Commands::Fetch {
            register_number,
            format,
            target,
            save,
        } => commands::fetch::execute(register_number, format, target, save, config).await,
        Commands::Health => commands::health::execute(config).await,
        Commands::Subject { action } => match action {
            SubjectAction::Add { code, name, sheet } => {
                commands::subject::add(code, name, sheet, config)
            }
            SubjectAction::Remove { code, sheet } => commands::subject::remove(code, sheet, config),
        },
        Commands::Mark {
            code,
            absent,
            date,
            note,
            sheet,
        } => commands::subject::mark(code, !absent, date, note, sheet, config),
        Commands::Set {
            code,
            attended,
            total,
            sheet,
        } => commands::subject::set(code, attended, total, sheet, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
