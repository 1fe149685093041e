use crate::models::CellValue;
use serde::{Deserialize, Serialize};

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets#Spreadsheet
#[derive(Debug, Deserialize)]
pub(crate) struct SpreadsheetResponse {
    pub(crate) properties: SpreadsheetProperties,
    #[serde(default)]
    pub(crate) sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpreadsheetProperties {
    pub(crate) title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetEntry {
    pub(crate) properties: SheetProperties,
}

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets/sheets#SheetProperties
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SheetProperties {
    #[serde(default)]
    pub(crate) sheet_id: i64,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) grid_properties: Option<GridProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GridProperties {
    #[serde(default)]
    pub(crate) row_count: u32,
    #[serde(default)]
    pub(crate) column_count: u32,
}

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values#ValueRange
// `values` is omitted entirely for an empty range.
#[derive(Debug, Deserialize)]
pub(super) struct ValueRangeResponse {
    #[serde(default)]
    pub(super) values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueRangeRequest<'a> {
    pub(super) major_dimension: &'static str,
    pub(super) values: &'a [Vec<CellValue>],
}

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/append#response-body
#[derive(Debug, Deserialize)]
pub(super) struct AppendResponse {
    pub(super) updates: UpdateValuesResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateValuesResponse {
    #[serde(default)]
    pub(super) updated_rows: usize,
}
