// src/activity/file.rs — Local JSON-lines table store
//
// One `<sheet>.jsonl` file per sheet key, one JSON array of strings per row.
// Transcripts contain newlines and tabs, so TSV is not an option.

use std::path::PathBuf;

use async_trait::async_trait;

use super::LogSink;
use crate::infra::errors::CoachError;

pub struct JsonlFileSink {
    dir: PathBuf,
}

impl JsonlFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        let safe: String = sheet
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.jsonl"))
    }
}

#[async_trait]
impl LogSink for JsonlFileSink {
    fn id(&self) -> &str {
        "file"
    }

    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, CoachError> {
        let path = self.sheet_path(sheet);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<Vec<String>>(line).map_err(|e| {
                    CoachError::sink("file", format!("{}: bad row: {}", path.display(), e))
                })
            })
            .collect()
    }

    async fn write_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), CoachError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut out = String::new();
        for row in rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }

        // Write-then-rename so a crash never leaves a half-written table.
        let path = self.sheet_path(sheet);
        let tmp = path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, out).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
