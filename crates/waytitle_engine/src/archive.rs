use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;

use waytitle_core::{parse_capture_rows, RetryPolicy, SnapshotReference};

use crate::retry::with_retries;

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Base URL of the CDX index query endpoint.
    pub cdx_base_url: String,
    /// Base URL of the snapshot replay service; `/web/{ts}/http://{domain}/`
    /// gets appended.
    pub replay_base_url: String,
    pub request_timeout: Duration,
    /// How many of the most recent successful captures the index query asks
    /// for.
    pub snapshot_limit: u32,
    pub retry: RetryPolicy,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            cdx_base_url: "https://web.archive.org/cdx/search/cdx".to_string(),
            replay_base_url: "https://web.archive.org".to_string(),
            request_timeout: Duration::from_secs(20),
            snapshot_limit: 3,
            retry: RetryPolicy::default(),
        }
    }
}

/// Raw bytes of one fetched capture, together with the Content-Type header
/// so the decoder can honor a declared charset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("archive returned status {0}")]
    Status(u16),
    #[error("unexpected archive response: {0}")]
    Data(String),
}

impl ArchiveError {
    /// Transport-level failures (including non-2xx statuses) are worth
    /// retrying; a malformed response body is not.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ArchiveError::Data(_))
    }
}

/// Client for the archive's index and snapshot-replay endpoints. Owns the
/// retry budget for both; no state is kept between calls.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: Client,
    settings: ArchiveSettings,
}

impl ArchiveClient {
    pub fn new(settings: ArchiveSettings) -> Result<Self, ArchiveError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ArchiveError::Transport(err.to_string()))?;
        Ok(Self { http, settings })
    }

    /// Query the index for the domain's most recent successful captures,
    /// newest first, header row stripped.
    ///
    /// The whole call is retried on transport failure; a response that parses
    /// but has the wrong shape fails immediately with `ArchiveError::Data`.
    pub async fn query_recent_snapshots(
        &self,
        domain: &str,
    ) -> Result<Vec<SnapshotReference>, ArchiveError> {
        let limit = self.settings.snapshot_limit.to_string();
        let params = [
            ("url", domain),
            ("output", "json"),
            ("limit", limit.as_str()),
            ("fl", "timestamp"),
            ("filter", "statuscode:200"),
            ("sort", "desc"),
        ];

        let retry = self.settings.retry;
        let http = &self.http;
        let cdx_url = self.settings.cdx_base_url.as_str();
        let params = &params;
        let text = with_retries(
            retry.max_attempts,
            "wayback index query",
            |err: &ArchiveError| err.is_transient().then_some(retry.delay),
            move || async move {
                let response = http
                    .get(cdx_url)
                    .query(params)
                    .send()
                    .await
                    .map_err(map_reqwest_error)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ArchiveError::Status(status.as_u16()));
                }
                response.text().await.map_err(map_reqwest_error)
            },
        )
        .await?;

        let rows: Vec<Vec<String>> = serde_json::from_str(&text)
            .map_err(|err| ArchiveError::Data(format!("index response is not an array of arrays: {err}")))?;
        parse_capture_rows(&rows).map_err(|err| ArchiveError::Data(err.to_string()))
    }

    /// Fetch the replayed page for one capture. Same retry policy as the
    /// index query; non-2xx counts as a failed attempt.
    pub async fn fetch_snapshot(
        &self,
        domain: &str,
        timestamp: &str,
    ) -> Result<Snapshot, ArchiveError> {
        let url = format!(
            "{}/web/{}/http://{}/",
            self.settings.replay_base_url.trim_end_matches('/'),
            timestamp,
            domain
        );

        let retry = self.settings.retry;
        let http = &self.http;
        let url = url.as_str();
        with_retries(
            retry.max_attempts,
            "wayback snapshot fetch",
            |err: &ArchiveError| err.is_transient().then_some(retry.delay),
            move || async move {
                let response = http
                    .get(url)
                    .send()
                    .await
                    .map_err(map_reqwest_error)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ArchiveError::Status(status.as_u16()));
                }
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(|value| value.to_string());
                let bytes = response.bytes().await.map_err(map_reqwest_error)?;
                Ok(Snapshot {
                    bytes: bytes.to_vec(),
                    content_type,
                })
            },
        )
        .await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ArchiveError {
    if err.is_timeout() {
        return ArchiveError::Timeout;
    }
    ArchiveError::Transport(err.to_string())
}
