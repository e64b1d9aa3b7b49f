// src/activity/memory.rs — In-process table store

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::LogSink;
use crate::infra::errors::CoachError;

/// Keeps tables in memory for the life of the process.
#[derive(Default)]
pub struct MemorySink {
    tables: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a table, empty when it was never written.
    pub fn table(&self, sheet: &str) -> Vec<Vec<String>> {
        self.tables
            .lock()
            .map(|t| t.get(sheet).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LogSink for MemorySink {
    fn id(&self) -> &str {
        "memory"
    }

    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, CoachError> {
        Ok(self.table(sheet))
    }

    async fn write_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), CoachError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| CoachError::sink("memory", "table lock poisoned"))?;
        tables.insert(sheet.to_string(), rows.to_vec());
        Ok(())
    }
}
