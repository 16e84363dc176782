use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use waytitle_core::{rowcol_to_a1, CellUpdate};

/// One worksheet of the target spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum SheetsError {
    /// The API's rate-limit signal (HTTP 429).
    #[error("spreadsheet API quota exceeded")]
    Quota,
    #[error("spreadsheet request failed: {0}")]
    Transport(String),
    #[error("spreadsheet API error (status {status}): {detail}")]
    Api { status: u16, detail: String },
    #[error("unexpected spreadsheet response: {0}")]
    Data(String),
}

impl SheetsError {
    /// Everything except a malformed response body is worth retrying.
    pub fn is_transient(&self) -> bool {
        !matches!(self, SheetsError::Data(_))
    }
}

/// The spreadsheet operations the pipeline needs. The concrete Google client
/// lives below; tests substitute an in-memory implementation.
#[async_trait]
pub trait SheetsClient: Send + Sync {
    /// Title of the spreadsheet document, used as the open-probe at startup.
    async fn spreadsheet_title(&self) -> Result<String, SheetsError>;

    async fn list_worksheets(&self) -> Result<Vec<Worksheet>, SheetsError>;

    /// All cell values of a worksheet, row-major, as formatted strings.
    async fn read_rows(&self, worksheet: &Worksheet) -> Result<Vec<Vec<String>>, SheetsError>;

    /// One atomic multi-cell write of every update in the slice.
    async fn batch_update(
        &self,
        worksheet: &Worksheet,
        updates: &[CellUpdate],
    ) -> Result<(), SheetsError>;
}

#[derive(Debug, Clone)]
pub struct SheetsSettings {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub request_timeout: Duration,
}

impl SheetsSettings {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            request_timeout: Duration::from_secs(20),
        }
    }
}

/// Sheets v4 REST client. Credential acquisition happens elsewhere; this
/// takes a ready bearer token.
pub struct GoogleSheetsClient {
    http: Client,
    settings: SheetsSettings,
    token: String,
}

impl GoogleSheetsClient {
    pub fn new(settings: SheetsSettings, token: impl Into<String>) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SheetsError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            settings,
            token: token.into(),
        })
    }

    fn spreadsheet_url(&self, tail: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|err| SheetsError::Data(format!("bad base url: {err}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::Data("base url cannot carry a path".to_string()))?;
            segments.pop_if_empty();
            segments.extend(["v4", "spreadsheets", self.settings.spreadsheet_id.as_str()]);
            segments.extend(tail);
        }
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, SheetsError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let text = check_status(response).await?;
        serde_json::from_str(&text).map_err(|err| SheetsError::Data(err.to_string()))
    }
}

#[async_trait]
impl SheetsClient for GoogleSheetsClient {
    async fn spreadsheet_title(&self) -> Result<String, SheetsError> {
        let mut url = self.spreadsheet_url(&[])?;
        url.query_pairs_mut().append_pair("fields", "properties.title");
        let meta: SpreadsheetMeta = self.get_json(url).await?;
        meta.properties
            .map(|props| props.title)
            .ok_or_else(|| SheetsError::Data("spreadsheet metadata has no properties".to_string()))
    }

    async fn list_worksheets(&self) -> Result<Vec<Worksheet>, SheetsError> {
        let mut url = self.spreadsheet_url(&[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        let meta: SpreadsheetMeta = self.get_json(url).await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| Worksheet {
                sheet_id: sheet.properties.sheet_id,
                title: sheet.properties.title,
            })
            .collect())
    }

    async fn read_rows(&self, worksheet: &Worksheet) -> Result<Vec<Vec<String>>, SheetsError> {
        let range = quote_sheet_title(&worksheet.title);
        let url = self.spreadsheet_url(&["values", range.as_str()])?;
        let value_range: ValueRange = self.get_json(url).await?;
        Ok(value_range.values)
    }

    async fn batch_update(
        &self,
        worksheet: &Worksheet,
        updates: &[CellUpdate],
    ) -> Result<(), SheetsError> {
        let sheet = quote_sheet_title(&worksheet.title);
        let request = BatchUpdateRequest {
            value_input_option: "RAW",
            data: updates
                .iter()
                .map(|update| ValueRangeEntry {
                    range: format!("{sheet}!{}", rowcol_to_a1(update.row, update.col)),
                    values: vec![vec![update.value.clone()]],
                })
                .collect(),
        };
        let body = serde_json::to_string(&request)
            .map_err(|err| SheetsError::Data(err.to_string()))?;

        let url = self.spreadsheet_url(&["values:batchUpdate"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response).await?;
        Ok(())
    }
}

/// A1 quoting for sheet titles: wrap in single quotes, double any embedded
/// ones.
fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

async fn check_status(response: reqwest::Response) -> Result<String, SheetsError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SheetsError::Quota);
    }
    let text = response.text().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        return Err(SheetsError::Api {
            status: status.as_u16(),
            detail: text,
        });
    }
    Ok(text)
}

fn map_reqwest_error(err: reqwest::Error) -> SheetsError {
    SheetsError::Transport(err.to_string())
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<ValueRangeEntry>,
}

#[derive(Debug, Serialize)]
struct ValueRangeEntry {
    range: String,
    values: Vec<Vec<String>>,
}
