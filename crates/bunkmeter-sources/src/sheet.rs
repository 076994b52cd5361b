//! Local attendance sheet source.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use bunkmeter_core::model::SubjectRecord;
use bunkmeter_core::parser::parse_sheet_str;
use bunkmeter_core::traits::AttendanceSource;

/// Reads counts from a TOML attendance sheet on disk.
pub struct SheetSource {
    path: PathBuf,
}

impl SheetSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn load(&self) -> anyhow::Result<Vec<SubjectRecord>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read sheet: {}", self.path.display()))?;
        let sheet = parse_sheet_str(&content, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            subjects = sheet.subjects.len(),
            "loaded attendance sheet"
        );
        Ok(sheet.records())
    }
}

#[async_trait]
impl AttendanceSource for SheetSource {
    fn name(&self) -> &str {
        "sheet"
    }

    async fn fetch(&self) -> anyhow::Result<Vec<SubjectRecord>> {
        self.load().await
    }
}
