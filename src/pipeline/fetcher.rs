//! HTTP client construction and COQL record retrieval
//!
//! This module handles:
//! - Building the shared HTTP client used by every stage
//! - Computing the trailing "yesterday through today" time window
//! - Rendering the COQL select statement
//! - Issuing the query and decoding the `data` list

use crate::state::{LeadField, Record};
use crate::PipelineError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Timestamp layout accepted by COQL datetime comparisons
const COQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Builds the HTTP client shared by all stages
///
/// No request or connect timeout is set; each call waits as long as the
/// transport does.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .build()
}

/// Inclusive creation-time window for the record query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
    offset: FixedOffset,
}

impl TimeWindow {
    /// From 00:00:00 yesterday to 23:59:59 today, in wall-clock time at `offset`
    pub fn trailing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = now.with_timezone(&offset).date_naive();
        let yesterday = today - Duration::days(1);

        let start = yesterday.and_time(NaiveTime::default());
        let end = today.and_time(NaiveTime::default()) + Duration::seconds(86_399);

        Self { start, end, offset }
    }

    /// Window start as a COQL timestamp, e.g. `2026-10-16T00:00:00+05:30`
    pub fn start(&self) -> String {
        self.format(self.start)
    }

    /// Window end as a COQL timestamp, e.g. `2026-10-17T23:59:59+05:30`
    pub fn end(&self) -> String {
        self.format(self.end)
    }

    fn format(&self, local: NaiveDateTime) -> String {
        format!("{}{}", local.format(COQL_TIMESTAMP_FORMAT), self.offset)
    }
}

/// Renders the COQL statement for `module` restricted to `window`
pub fn build_select_query(module: &str, window: &TimeWindow) -> String {
    let columns: Vec<&str> = LeadField::all_fields()
        .iter()
        .map(LeadField::api_name)
        .collect();

    format!(
        "SELECT {} FROM {} WHERE Created_Time >= '{}' AND Created_Time <= '{}'",
        columns.join(", "),
        module,
        window.start(),
        window.end()
    )
}

#[derive(Debug, Deserialize)]
struct CoqlResponse {
    #[serde(default)]
    data: Vec<Record>,
}

/// Runs a COQL query and returns the matched records
///
/// An HTTP 204 (Zoho's answer when nothing matches) or a body without a
/// `data` list yields an empty vector rather than an error.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The COQL endpoint
/// * `access_token` - Bearer token from the credential refresh
/// * `query` - The rendered select statement
pub async fn fetch_records(
    client: &Client,
    url: &str,
    access_token: &str,
    query: &str,
) -> Result<Vec<Record>, PipelineError> {
    let response = client
        .post(url)
        .bearer_auth(access_token)
        .json(&serde_json::json!({ "select_query": query }))
        .send()
        .await
        .map_err(|e| PipelineError::Fetch(describe_transport_error(&e)))?;

    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(Vec::new());
    }

    if !status.is_success() {
        return Err(PipelineError::Fetch(status_message(
            status,
            response.text().await,
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| PipelineError::Fetch(format!("failed to read response body: {}", e)))?;

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: CoqlResponse = serde_json::from_str(&body)
        .map_err(|e| PipelineError::Fetch(format!("invalid response body: {}", e)))?;

    Ok(parsed.data)
}

/// Short description of a transport-level failure
pub(crate) fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

/// Describes a non-2xx reply from its status and the attempt to read its body
pub(crate) fn status_message<E: std::fmt::Display>(
    status: StatusCode,
    body: Result<String, E>,
) -> String {
    match body {
        Ok(body) => format!("HTTP {}: {}", status.as_u16(), truncate(&body)),
        Err(e) => {
            tracing::debug!(status = status.as_u16(), "Failed to read error body: {}", e);
            format!("HTTP {} (unreadable body: {})", status.as_u16(), e)
        }
    }
}

/// Caps an error body so a full HTML error page doesn't land in the state
fn truncate(body: &str) -> String {
    const LIMIT: usize = 300;
    let body = body.trim();
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
