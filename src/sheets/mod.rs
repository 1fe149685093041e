mod client;
pub(crate) mod types;

pub use client::{SPREADSHEETS_SCOPE, SheetsClient};

use crate::error::Result;
use crate::models::{CellValue, SpreadsheetMetadata};
use async_trait::async_trait;

#[async_trait]
pub trait SheetOperations {
    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata>;

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;

    /// Insert `rows` after the last row of the table in `range`. Returns the updated row count.
    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<usize>;

    /// Overwrite cells starting at the top-left of `range`.
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<()>;
}
