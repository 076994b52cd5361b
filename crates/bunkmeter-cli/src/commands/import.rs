//! The `bunkmeter import` command.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;

use bunkmeter_core::import::{disambiguate_codes, import_rows};
use bunkmeter_core::sheet::create_sheet;

pub fn execute(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let text = read_input(&input)?;
    let mut records = import_rows(&text)?;
    tracing::info!(rows = records.len(), "imported attendance rows");

    let Some(output) = output else {
        let mut table = Table::new();
        table.set_header(vec!["Code", "Subject", "Attended", "Total"]);
        for r in &records {
            table.add_row(vec![
                r.code.clone(),
                r.name.clone(),
                r.attended.to_string(),
                r.total.to_string(),
            ]);
        }
        println!("{table}");
        return Ok(());
    };

    anyhow::ensure!(
        !output.exists(),
        "{} already exists; choose another --output",
        output.display()
    );
    let renamed = disambiguate_codes(&mut records);
    if renamed > 0 {
        eprintln!("Note: {renamed} repeated subject code(s) were given a numeric suffix");
    }
    create_sheet(&output, &records)?;
    println!(
        "Created {} with {} subject(s)",
        output.display(),
        records.len()
    );

    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))
    }
}
