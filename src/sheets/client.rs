use super::SheetOperations;
use super::types::{AppendResponse, SpreadsheetResponse, ValueRangeRequest, ValueRangeResponse};
use crate::auth::{Clock, ServiceAccountCredential, ServiceAccountMinter, SystemClock, TokenCache};
use crate::config::GoogleConfig;
use crate::error::{ConfigError, Result, SheetError};
use crate::models::{CellValue, SpreadsheetMetadata};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

// Read and write access to all of the service account's spreadsheets
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Google Sheets v4 REST client authenticating as a service account.
///
/// The client owns its token cache, so concurrent flows borrowing one client (usually through
/// one `RowMapper`) share one access token.
pub struct SheetsClient {
    client: Client,
    api_base_url: Url,
    credential: ServiceAccountCredential,
    tokens: TokenCache<ServiceAccountMinter>,
}

impl SheetsClient {
    pub fn new(config: &GoogleConfig, credential: ServiceAccountCredential) -> Result<Self> {
        Self::with_clock(config, credential, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &GoogleConfig,
        credential: ServiceAccountCredential,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let api_base_url = Url::parse(&config.api_base_url).map_err(|e| {
            ConfigError::Invalid(format!("Invalid api_base_url '{}': {}", config.api_base_url, e))
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "api_base_url '{}' cannot be used as a base URL",
                config.api_base_url
            ))
            .into());
        }

        let client = reqwest::ClientBuilder::new()
            .build()
            .map_err(|e| ConfigError::Invalid(format!("Failed to build reqwest client: {}", e)))?;

        let minter = ServiceAccountMinter::new(client.clone(), &config.token_url, clock.clone());

        Ok(Self {
            client,
            api_base_url,
            credential,
            tokens: TokenCache::new(minter, clock),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base_url.clone();
        // Checked to be a base URL on construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn access_token(&self) -> Result<String> {
        Ok(self.tokens.get_token(&self.credential).await?)
    }
}

async fn failure_detail(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("{} - {}", status, body)
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetOperations for SheetsClient {
    #[instrument(name = "Fetching spreadsheet metadata", skip(self))]
    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata> {
        let token = self.access_token().await?;
        let url = self.endpoint(&["spreadsheets", spreadsheet_id]);

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .query(&[("fields", "properties.title,sheets.properties")])
            .send()
            .await
            .map_err(|e| SheetError::NotFound(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SheetError::NotFound(failure_detail(response).await).into());
        }

        let spreadsheet: SpreadsheetResponse = response
            .json()
            .await
            .map_err(|e| SheetError::NotFound(format!("Invalid metadata response: {}", e)))?;

        let metadata = SpreadsheetMetadata::from(spreadsheet);
        debug!(tabs = metadata.tabs.len(), "Fetched metadata");

        Ok(metadata)
    }

    #[instrument(name = "Reading values", skip(self))]
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let token = self.access_token().await?;
        let url = self.endpoint(&["spreadsheets", spreadsheet_id, "values", range]);

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .map_err(|e| SheetError::ReadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SheetError::ReadFailed(failure_detail(response).await).into());
        }

        let value_range: ValueRangeResponse = response
            .json()
            .await
            .map_err(|e| SheetError::ReadFailed(format!("Invalid values response: {}", e)))?;

        let rows: Vec<Vec<String>> = value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        debug!(rows = rows.len(), "Read values");

        Ok(rows)
    }

    #[instrument(name = "Appending values", skip(self, rows), fields(rows = rows.len()))]
    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<usize> {
        let token = self.access_token().await?;
        let target = format!("{}:append", range);
        let url = self.endpoint(&["spreadsheets", spreadsheet_id, "values", &target]);

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&ValueRangeRequest {
                major_dimension: "ROWS",
                values: rows,
            })
            .send()
            .await
            .map_err(|e| SheetError::AppendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SheetError::AppendFailed(failure_detail(response).await).into());
        }

        let appended: AppendResponse = response
            .json()
            .await
            .map_err(|e| SheetError::AppendFailed(format!("Invalid append response: {}", e)))?;

        Ok(appended.updates.updated_rows)
    }

    #[instrument(name = "Updating values", skip(self, rows), fields(rows = rows.len()))]
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<()> {
        let token = self.access_token().await?;
        let url = self.endpoint(&["spreadsheets", spreadsheet_id, "values", range]);

        let response = self
            .client
            .put(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRangeRequest {
                major_dimension: "ROWS",
                values: rows,
            })
            .send()
            .await
            .map_err(|e| SheetError::AppendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SheetError::AppendFailed(failure_detail(response).await).into());
        }

        Ok(())
    }
}
