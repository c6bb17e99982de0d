use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::types::{RawRow, RowSource};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Row source adapter for the Google Sheets values endpoint. Takes an
/// already-issued access token; obtaining and refreshing it is the
/// caller's concern.
pub struct SheetsRowSource {
    client: Client,
    access_token: String,
    spreadsheet_id: String,
    range: String,
    base_url: String,
}

impl SheetsRowSource {
    pub fn new(
        access_token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        Self::with_base_url(
            access_token,
            spreadsheet_id,
            range,
            timeout_seconds,
            DEFAULT_BASE_URL,
        )
    }

    /// Custom base URL for pointing at a mock server in tests.
    pub fn with_base_url(
        access_token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        timeout_seconds: u64,
        base_url: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            access_token: access_token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    // Absent entirely when the requested range is empty.
    #[serde(default)]
    values: Vec<RawRow>,
}

#[async_trait::async_trait]
impl RowSource for SheetsRowSource {
    fn source_name(&self) -> &'static str {
        "google_sheets"
    }

    #[instrument(skip(self), fields(spreadsheet_id = %self.spreadsheet_id, range = %self.range))]
    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, self.range
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?
            .error_for_status()?;

        let body: ValuesResponse = response.json().await?;
        info!("Fetched {} rows from spreadsheet", body.values.len());
        Ok(body.values)
    }
}
