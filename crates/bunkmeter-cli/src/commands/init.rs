//! The `bunkmeter init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing("bunkmeter.toml", SAMPLE_CONFIG)?;
    write_if_missing("attendance.toml", SAMPLE_SHEET)?;

    println!("\nNext steps:");
    println!("  1. Edit attendance.toml with your subjects and counts");
    println!("  2. Run: bunkmeter validate");
    println!("  3. Run: bunkmeter report");
    println!("  4. After each class: bunkmeter mark <CODE> [--absent]");

    Ok(())
}

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# bunkmeter configuration

target_percent = 75.0
sheet = "attendance.toml"
output_format = "table"

[remote]
base_url = "http://localhost:5000"
register_number = "${BUNKMETER_REGISTER_NUMBER}"
password = "${BUNKMETER_PASSWORD}"
timeout_secs = 60
"#;

const SAMPLE_SHEET: &str = r#"# Attendance sheet. Keep one [[subjects]] entry per course.

[sheet]
target_percent = 75.0

[[subjects]]
code = "CS301"
name = "Operating Systems"
attended = 30
total = 40

[[subjects]]
code = "MA201"
name = "Probability and Statistics"
attended = 10
total = 20
"#;
