//! Google Sheets v4 backend.
//!
//! The spreadsheet is found by name through the Drive v3 file listing
//! (unless an id is configured) and the first worksheet is used as the
//! queue. Ranges are A1 notation with the worksheet title quoted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::QueueError;
use super::traits::QueueBackend;
use crate::auth::TokenSource;
use crate::config::{NetworkConfig, QueueConfig};
use crate::retry::{with_retry, RetryConfig};

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Spreadsheet letter for a 1-based column index (`1 -> A`, `27 -> AA`).
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl ValueRange {
    fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect()
    }
}

/// Queue backed by the first worksheet of a Google spreadsheet.
pub struct SheetsQueue {
    client: Client,
    tokens: Arc<dyn TokenSource>,
    sheets_base: String,
    spreadsheet_id: String,
    sheet_title: String,
    retry: RetryConfig,
}

impl SheetsQueue {
    /// Resolve the spreadsheet and its first worksheet.
    pub async fn open(
        config: &QueueConfig,
        tokens: Arc<dyn TokenSource>,
        network: &NetworkConfig,
    ) -> Result<Self, QueueError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(network.timeout_secs))
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .build()
            .map_err(QueueError::from_reqwest)?;

        let mut queue = Self {
            client,
            tokens,
            sheets_base: config.sheets_api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: String::new(),
            sheet_title: String::new(),
            retry: RetryConfig::from(network),
        };

        queue.spreadsheet_id = match &config.spreadsheet_id {
            Some(id) => id.clone(),
            None => {
                queue
                    .find_spreadsheet(&config.drive_api_base, &config.spreadsheet_name)
                    .await?
            }
        };
        queue.sheet_title = queue.first_sheet_title().await?;

        info!(
            spreadsheet_id = %queue.spreadsheet_id,
            worksheet = %queue.sheet_title,
            "Opened queue spreadsheet"
        );
        Ok(queue)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn sheet_title(&self) -> &str {
        &self.sheet_title
    }

    async fn find_spreadsheet(&self, drive_base: &str, name: &str) -> Result<String, QueueError> {
        let url = format!("{}/drive/v3/files", drive_base.trim_end_matches('/'));
        let q = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let query = [
            ("q", q.as_str()),
            ("fields", "files(id,name)"),
            ("pageSize", "1"),
        ];

        debug!("Looking up spreadsheet '{}'", name);
        let list: FileList = self.get_json("drive.files.list", &url, &query).await?;
        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| QueueError::SpreadsheetNotFound(name.to_string()))
    }

    async fn first_sheet_title(&self) -> Result<String, QueueError> {
        let url = format!("{}/v4/spreadsheets/{}", self.sheets_base, self.spreadsheet_id);
        let meta: SpreadsheetMeta = self
            .get_json("sheets.spreadsheets.get", &url, &[("fields", "sheets.properties.title")])
            .await
            .map_err(|e| match e {
                QueueError::Api { status: 404, .. } => {
                    QueueError::SpreadsheetNotFound(self.spreadsheet_id.clone())
                }
                other => other,
            })?;

        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| QueueError::NoWorksheet(self.spreadsheet_id.clone()))
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.sheets_base,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, QueueError> {
        let url = self.values_url(range);
        let values: ValueRange = self
            .get_json("sheets.values.get", &url, &[("majorDimension", "ROWS")])
            .await?;
        Ok(values.into_rows())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, QueueError> {
        with_retry(&self.retry, operation, move || async move {
            let token = self.tokens.access_token().await?;
            let response = self
                .client
                .get(url)
                .bearer_auth(&token)
                .query(query)
                .send()
                .await
                .map_err(QueueError::from_reqwest)?;
            Self::parse_response(response).await
        })
        .await
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, QueueError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response).await);
        }
        response
            .json()
            .await
            .map_err(|e| QueueError::InvalidResponse(e.to_string()))
    }

    async fn api_error(status: StatusCode, response: Response) -> QueueError {
        let body = response.text().await.unwrap_or_default();
        QueueError::Api {
            status: status.as_u16(),
            message: body,
        }
    }
}

fn check_index(row: usize, col: usize) -> Result<(), QueueError> {
    if row == 0 || col == 0 {
        return Err(QueueError::InvalidIndex { row, col });
    }
    Ok(())
}

#[async_trait]
impl QueueBackend for SheetsQueue {
    fn name(&self) -> &str {
        "google_sheets"
    }

    async fn row_values(&self, row: usize) -> Result<Vec<String>, QueueError> {
        check_index(row, 1)?;
        let range = format!("{}!{}:{}", quote_title(&self.sheet_title), row, row);
        Ok(self.read_range(&range).await?.into_iter().next().unwrap_or_default())
    }

    async fn all_values(&self) -> Result<Vec<Vec<String>>, QueueError> {
        self.read_range(&quote_title(&self.sheet_title)).await
    }

    async fn cell(&self, row: usize, col: usize) -> Result<String, QueueError> {
        check_index(row, col)?;
        let range = format!("{}!{}{}", quote_title(&self.sheet_title), column_letter(col), row);
        Ok(self
            .read_range(&range)
            .await?
            .into_iter()
            .next()
            .and_then(|r| r.into_iter().next())
            .unwrap_or_default())
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), QueueError> {
        check_index(row, col)?;
        let range = format!("{}!{}{}", quote_title(&self.sheet_title), column_letter(col), row);
        let url = self.values_url(&range);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value]],
        });
        let (url, body) = (&url, &body);

        debug!(range = %range, "Updating cell");
        with_retry(&self.retry, "sheets.values.update", move || async move {
            let token = self.tokens.access_token().await?;
            let response = self
                .client
                .put(url)
                .bearer_auth(&token)
                .query(&[("valueInputOption", "RAW")])
                .json(body)
                .send()
                .await
                .map_err(QueueError::from_reqwest)?;
            let status = response.status();
            if !status.is_success() {
                return Err(Self::api_error(status, response).await);
            }
            Ok(())
        })
        .await
    }
}
