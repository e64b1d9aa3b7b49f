// src/activity/mod.rs — Conversation snapshots and activity events
//
// Two tables, each addressed by a sheet key:
//   conversations: [timestamp, session_id, week, transcript]   upsert by session_id
//   activity:      [timestamp, session_id, description]        append only

pub mod file;
pub mod google_sheets;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::infra::errors::CoachError;
use crate::provider::Message;

/// A row-oriented table store. No schema beyond column order.
#[async_trait]
pub trait LogSink: Send + Sync {
    fn id(&self) -> &str;

    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, CoachError>;

    /// Replace the whole table for `sheet`.
    async fn write_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), CoachError>;
}

#[async_trait]
impl<T: LogSink + ?Sized> LogSink for std::sync::Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, CoachError> {
        (**self).read_rows(sheet).await
    }

    async fn write_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), CoachError> {
        (**self).write_rows(sheet, rows).await
    }
}

/// Column holding the session id in both tables.
const SESSION_COLUMN: usize = 1;

/// Flattened conversation record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub week: String,
    pub transcript: String,
}

impl LogEntry {
    pub fn new(session_id: &str, week: &str, transcript: &[Message]) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            week: week.to_string(),
            transcript: flatten_transcript(transcript),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_timestamp(&self.timestamp),
            self.session_id.clone(),
            self.week.clone(),
            self.transcript.clone(),
        ]
    }
}

/// "role: content" per message, newline separated.
pub fn flatten_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Insert-or-replace `row` keyed by its session id column.
///
/// Returns true when an existing row was replaced. Extra rows for the same
/// session are dropped so the table holds exactly one. A row too short to
/// carry a session id is appended as is.
pub fn upsert_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) -> bool {
    let Some(key) = row.get(SESSION_COLUMN).cloned() else {
        rows.push(row);
        return false;
    };
    let matches = |r: &Vec<String>| r.get(SESSION_COLUMN) == Some(&key);

    match rows.iter().position(matches) {
        Some(first) => {
            rows[first] = row;
            let mut index = 0;
            rows.retain(|r| {
                let keep = index <= first || !matches(r);
                index += 1;
                keep
            });
            true
        }
        None => {
            rows.push(row);
            false
        }
    }
}

/// A log sink bound to the conversation and activity sheet names.
pub struct ActivityLog {
    sink: Box<dyn LogSink>,
    conversation_sheet: String,
    activity_sheet: String,
}

impl ActivityLog {
    pub fn new(
        sink: Box<dyn LogSink>,
        conversation_sheet: impl Into<String>,
        activity_sheet: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            conversation_sheet: conversation_sheet.into(),
            activity_sheet: activity_sheet.into(),
        }
    }

    pub fn sink_id(&self) -> &str {
        self.sink.id()
    }

    /// Upsert the conversation row for `entry.session_id`.
    pub async fn log_snapshot(&self, entry: &LogEntry) -> Result<(), CoachError> {
        let mut rows = self.sink.read_rows(&self.conversation_sheet).await?;
        let replaced = upsert_row(&mut rows, entry.to_row());
        self.sink.write_rows(&self.conversation_sheet, &rows).await?;
        tracing::debug!(
            session = %entry.session_id,
            replaced,
            "conversation snapshot written to {}",
            self.sink.id()
        );
        Ok(())
    }

    /// Append one activity row.
    pub async fn log_activity(&self, session_id: &str, description: &str) -> Result<(), CoachError> {
        let mut rows = self.sink.read_rows(&self.activity_sheet).await?;
        rows.push(vec![
            format_timestamp(&Utc::now()),
            session_id.to_string(),
            description.to_string(),
        ]);
        self.sink.write_rows(&self.activity_sheet, &rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(ts: &str, id: &str, body: &str) -> Vec<String> {
        vec![ts.into(), id.into(), "Week 1: X".into(), body.into()]
    }

    #[test]
    fn test_flatten_transcript() {
        let blob = flatten_transcript(&[Message::user("hi"), Message::assistant("hello")]);
        assert_eq!(blob, "user: hi\nassistant: hello");
    }

    #[test]
    fn test_flatten_empty() {
        assert_eq!(flatten_transcript(&[]), "");
    }

    #[test]
    fn test_upsert_appends_new_session() {
        let mut rows = vec![row("t0", "a", "x")];
        assert!(!upsert_row(&mut rows, row("t1", "b", "y")));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "b");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut rows = vec![row("t0", "a", "x"), row("t0", "b", "y"), row("t0", "c", "z")];
        assert!(upsert_row(&mut rows, row("t1", "b", "y2")));
        assert_eq!(
            rows,
            vec![row("t0", "a", "x"), row("t1", "b", "y2"), row("t0", "c", "z")]
        );
    }

    #[test]
    fn test_upsert_collapses_duplicates() {
        let mut rows = vec![
            row("t0", "a", "1"),
            row("t0", "x", "keep"),
            row("t0", "a", "2"),
            row("t0", "a", "3"),
        ];
        upsert_row(&mut rows, row("t1", "a", "new"));
        assert_eq!(rows, vec![row("t1", "a", "new"), row("t0", "x", "keep")]);
    }

    #[test]
    fn test_upsert_ignores_short_rows() {
        let mut rows = vec![vec!["header-only".to_string()]];
        assert!(!upsert_row(&mut rows, row("t1", "a", "x")));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_upsert_row_without_session_id_appends() {
        let mut rows = vec![row("t0", "a", "x")];
        assert!(!upsert_row(&mut rows, vec!["t1".to_string()]));
        assert!(!upsert_row(&mut rows, Vec::new()));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["t1".to_string()]);
    }

    #[test]
    fn test_log_entry_row_shape() {
        let entry = LogEntry::new("sid", "Week 1: X", &[Message::user("hi")]);
        let r = entry.to_row();
        assert_eq!(r.len(), 4);
        assert_eq!(r[1], "sid");
        assert_eq!(r[2], "Week 1: X");
        assert_eq!(r[3], "user: hi");
        assert!(r[0].ends_with('Z'));
    }
}
