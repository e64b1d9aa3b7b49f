// src/activity/google_sheets.rs — Google Sheets table store (REST API + OAuth2)
//
// Uses the Sheets API v4 values endpoints. Each sheet key is a tab name in
// one spreadsheet. A write puts the full table at A1, then clears the rows
// below it.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::LogSink;
use crate::infra::errors::CoachError;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 material for the refresh-token exchange.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub client_secret: String,
}

impl GoogleCredentials {
    /// Read `GOOGLE_SHEETS_TOKEN`, `GOOGLE_REFRESH_TOKEN`, `GOOGLE_CLIENT_ID`
    /// and `GOOGLE_CLIENT_SECRET`.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            access_token: var("GOOGLE_SHEETS_TOKEN"),
            refresh_token: var("GOOGLE_REFRESH_TOKEN"),
            client_id: var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
        }
    }
}

pub struct GoogleSheetsSink {
    client: Client,
    spreadsheet_id: String,
    access_token: String,
    base_url: String,
}

impl GoogleSheetsSink {
    pub fn new(spreadsheet_id: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            spreadsheet_id,
            access_token,
            base_url: SHEETS_API_BASE.into(),
        }
    }

    /// Build a sink, exchanging the refresh token when one is configured.
    pub async fn connect(
        spreadsheet_id: String,
        creds: &GoogleCredentials,
    ) -> Result<Self, CoachError> {
        let token = match (&creds.refresh_token, &creds.access_token) {
            (Some(refresh), _) => refresh_access_token(&Client::new(), refresh, creds).await?,
            (None, Some(access)) => access.clone(),
            (None, None) => {
                return Err(CoachError::Config(
                    "Google Sheets logging needs GOOGLE_SHEETS_TOKEN or GOOGLE_REFRESH_TOKEN".into(),
                ))
            }
        };
        Ok(Self::new(spreadsheet_id, token))
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoded(range)
        )
    }
}

async fn refresh_access_token(
    client: &Client,
    refresh_token: &str,
    creds: &GoogleCredentials,
) -> Result<String, CoachError> {
    #[derive(Deserialize)]
    struct TokenResp {
        access_token: String,
    }

    let resp = client
        .post(TOKEN_URL)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
        ])
        .send()
        .await
        .map_err(|e| CoachError::sink("google_sheets", e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(CoachError::sink(
            "google_sheets",
            format!("Token refresh returned {status}: {body}"),
        ));
    }

    let token: TokenResp = resp
        .json()
        .await
        .map_err(|e| CoachError::sink("google_sheets", e.to_string()))?;
    tracing::debug!("Refreshed Google access token");
    Ok(token.access_token)
}

// -- Google Sheets API types --

#[derive(Deserialize)]
struct ValueRangeResp {
    values: Option<Vec<Vec<serde_json::Value>>>,
}

fn cell_to_string(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl LogSink for GoogleSheetsSink {
    fn id(&self) -> &str {
        "google_sheets"
    }

    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, CoachError> {
        let resp = self
            .client
            .get(self.values_url(sheet))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| CoachError::sink("google_sheets", e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CoachError::sink(
                "google_sheets",
                format!("Google Sheets API returned {status}: {body}"),
            ));
        }

        let vr: ValueRangeResp = resp
            .json()
            .await
            .map_err(|e| CoachError::sink("google_sheets", e.to_string()))?;

        Ok(vr
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn write_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), CoachError> {
        // The tab is only trimmed after the new table is stored.
        if !rows.is_empty() {
            let body = serde_json::json!({
                "range": sheet,
                "majorDimension": "ROWS",
                "values": rows,
            });

            let resp = self
                .client
                .put(self.values_url(sheet))
                .bearer_auth(&self.access_token)
                .query(&[("valueInputOption", "RAW")])
                .json(&body)
                .send()
                .await
                .map_err(|e| CoachError::sink("google_sheets", e.to_string()))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(CoachError::sink(
                    "google_sheets",
                    format!("Google Sheets write returned {status}: {text}"),
                ));
            }
        }

        // Rows past the new table are leftovers from a longer one.
        let tail = tail_range(sheet, rows.len());
        let clear = self
            .client
            .post(format!("{}:clear", self.values_url(&tail)))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| CoachError::sink("google_sheets", e.to_string()))?;

        if !clear.status().is_success() {
            let status = clear.status();
            let text = clear.text().await.unwrap_or_default();
            return Err(CoachError::sink(
                "google_sheets",
                format!("Google Sheets clear returned {status}: {text}"),
            ));
        }

        Ok(())
    }
}

/// A1 range covering every row after the first `len` rows of `sheet`.
fn tail_range(sheet: &str, len: usize) -> String {
    format!("{sheet}!A{}:Z", len + 1)
}

/// Simple URL encoding for sheet names.
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25")
        .replace(' ', "%20")
        .replace('!', "%21")
        .replace('\'', "%27")
        .replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url() {
        let sink = GoogleSheetsSink::new("abc".into(), "tok".into());
        assert_eq!(
            sink.values_url("conversations"),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/conversations"
        );
        assert!(sink.values_url("my log").ends_with("/values/my%20log"));
    }

    #[test]
    fn test_urlencoded_escapes_percent_first() {
        assert_eq!(urlencoded("a b%"), "a%20b%25");
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(serde_json::json!("x")), "x");
        assert_eq!(cell_to_string(serde_json::json!(3)), "3");
        assert_eq!(cell_to_string(serde_json::Value::Null), "");
    }

    #[tokio::test]
    async fn test_connect_without_tokens_is_config_error() {
        let creds = GoogleCredentials {
            access_token: None,
            refresh_token: None,
            client_id: String::new(),
            client_secret: String::new(),
        };
        let err = GoogleSheetsSink::connect("abc".into(), &creds).await.err().unwrap();
        assert!(matches!(err, CoachError::Config(_)));
    }

    #[tokio::test]
    async fn test_connect_with_access_token() {
        let creds = GoogleCredentials {
            access_token: Some("tok".into()),
            refresh_token: None,
            client_id: String::new(),
            client_secret: String::new(),
        };
        let sink = GoogleSheetsSink::connect("abc".into(), &creds).await.unwrap();
        assert_eq!(sink.access_token, "tok");
        assert_eq!(sink.id(), "google_sheets");
    }

    // ─── Local values API stand-in ──────────────────────────────────

    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use crate::activity::{ActivityLog, LogEntry};
    use crate::provider::Message;

    /// One tab's worth of cells plus the requests that touched it.
    #[derive(Default)]
    struct StubSheet {
        rows: Vec<Vec<String>>,
        requests: Vec<String>,
        fail_put: bool,
    }

    /// Serve the values endpoints on localhost and return the API base URL.
    async fn serve(sheet: Arc<Mutex<StubSheet>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let sheet = sheet.clone();
                tokio::spawn(async move {
                    let (method, path, body) = read_request(&mut socket).await;
                    let (status, reply) = handle(&sheet, &method, &path, &body);
                    let resp = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                        reply.len()
                    );
                    let _ = socket.write_all(resp.as_bytes()).await;
                });
            }
        });
        format!("http://{addr}/v4")
    }

    async fn read_request(socket: &mut TcpStream) -> (String, String, String) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break i + 4;
            }
            if n == 0 {
                break buf.len();
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let length = head
            .lines()
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                if key.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        while buf.len() < head_end + length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut parts = head.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();
        let body = String::from_utf8_lossy(&buf[head_end..]).to_string();
        (method, path, body)
    }

    fn handle(
        sheet: &Mutex<StubSheet>,
        method: &str,
        path: &str,
        body: &str,
    ) -> (&'static str, String) {
        let mut sheet = sheet.lock().unwrap();
        let path = path.split('?').next().unwrap_or_default();
        sheet.requests.push(format!("{method} {path}"));

        match method {
            "GET" => (
                "200 OK",
                serde_json::json!({ "values": sheet.rows }).to_string(),
            ),
            "PUT" if sheet.fail_put => ("500 Internal Server Error", "{}".into()),
            "PUT" => {
                let body: serde_json::Value = serde_json::from_str(body).unwrap();
                let values: Vec<Vec<String>> =
                    serde_json::from_value(body["values"].clone()).unwrap();
                for (i, row) in values.into_iter().enumerate() {
                    if i < sheet.rows.len() {
                        sheet.rows[i] = row;
                    } else {
                        sheet.rows.push(row);
                    }
                }
                ("200 OK", "{}".into())
            }
            "POST" => {
                // ".../values/<tab>%21A<n>:Z:clear"; a bare tab clears from row 1.
                let start = path
                    .split("%21A")
                    .nth(1)
                    .and_then(|rest| rest.split(':').next())
                    .and_then(|n| n.parse::<usize>().ok())
                    .unwrap_or(1);
                sheet.rows.truncate(start.saturating_sub(1));
                ("200 OK", "{}".into())
            }
            _ => ("404 Not Found", "{}".into()),
        }
    }

    async fn stub_sink(sheet: &Arc<Mutex<StubSheet>>) -> GoogleSheetsSink {
        let mut sink = GoogleSheetsSink::new("abc".into(), "tok".into());
        sink.base_url = serve(sheet.clone()).await;
        sink
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_tail_range() {
        assert_eq!(tail_range("conversations", 2), "conversations!A3:Z");
        assert_eq!(tail_range("activity", 0), "activity!A1:Z");
    }

    #[tokio::test]
    async fn test_read_rows_from_api() {
        let sheet = Arc::new(Mutex::new(StubSheet {
            rows: vec![row(&["t", "s1", "Week 1: X", "user: hi"])],
            ..Default::default()
        }));
        let sink = stub_sink(&sheet).await;

        let rows = sink.read_rows("conversations").await.unwrap();
        assert_eq!(rows, vec![row(&["t", "s1", "Week 1: X", "user: hi"])]);
    }

    #[tokio::test]
    async fn test_failed_put_keeps_existing_rows() {
        let sheet = Arc::new(Mutex::new(StubSheet {
            rows: vec![row(&["t", "s1", "w", "a"]), row(&["t", "s2", "w", "b"])],
            fail_put: true,
            ..Default::default()
        }));
        let sink = stub_sink(&sheet).await;

        let err = sink
            .write_rows("conversations", &[row(&["t", "s1", "w", "c"])])
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::Sink { .. }));

        let state = sheet.lock().unwrap();
        assert_eq!(state.rows.len(), 2);
        assert_eq!(
            state.requests,
            vec!["PUT /v4/spreadsheets/abc/values/conversations"]
        );
    }

    #[tokio::test]
    async fn test_write_clears_only_rows_past_new_table() {
        let sheet = Arc::new(Mutex::new(StubSheet {
            rows: vec![
                row(&["t", "s1", "w", "a"]),
                row(&["t", "s2", "w", "b"]),
                row(&["t", "s3", "w", "c"]),
            ],
            ..Default::default()
        }));
        let sink = stub_sink(&sheet).await;

        let table = vec![row(&["t", "s1", "w", "a2"]), row(&["t", "s2", "w", "b"])];
        sink.write_rows("conversations", &table).await.unwrap();

        let state = sheet.lock().unwrap();
        assert_eq!(state.rows, table);
        assert_eq!(
            state.requests,
            vec![
                "PUT /v4/spreadsheets/abc/values/conversations",
                "POST /v4/spreadsheets/abc/values/conversations%21A3:Z:clear",
            ]
        );
    }

    #[tokio::test]
    async fn test_snapshot_upsert_collapses_duplicates() {
        let sheet = Arc::new(Mutex::new(StubSheet {
            rows: vec![
                row(&["t", "s1", "Week 1: X", "old"]),
                row(&["t", "s2", "Week 1: X", "other"]),
                row(&["t", "s1", "Week 1: X", "stale copy"]),
            ],
            ..Default::default()
        }));
        let log = ActivityLog::new(
            Box::new(stub_sink(&sheet).await),
            "conversations",
            "activity",
        );

        let entry = LogEntry::new(
            "s1",
            "Week 1: X",
            &[Message::user("hi"), Message::assistant("hello")],
        );
        log.log_snapshot(&entry).await.unwrap();
        log.log_snapshot(&LogEntry::new("s3", "Week 2: Y", &[]))
            .await
            .unwrap();

        let state = sheet.lock().unwrap();
        let sessions: Vec<&str> = state.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(sessions, vec!["s1", "s2", "s3"]);
        assert_eq!(state.rows[0][3], "user: hi\nassistant: hello");
    }
}
