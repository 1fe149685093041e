use crate::error::{Result, SheetError};
use crate::models::{
    CellValue, Columns, DEFAULT_CELLS, FromSheetRows, RangeSpec, Record, SpreadsheetMetadata,
    ToSheetRows,
};
use crate::sheets::SheetOperations;
use clap::ValueEnum;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReadFormat {
    /// One object per data row, keyed by the header row
    #[default]
    Objects,
    /// Rows exactly as stored, header included
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppendOutcome {
    pub written: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadData {
    Objects(Vec<Record>),
    Raw(Vec<Vec<String>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadOutcome {
    pub data: ReadData,
    /// Rows in the range, header row included, for both formats.
    pub count: usize,
}

/// Maps between field-keyed records and header-aligned sheet rows.
pub struct RowMapper<SC> {
    sheets_client: SC,
    // Held from the header read until the append settles.
    write_lock: Mutex<()>,
}

impl<SC> RowMapper<SC>
where
    SC: SheetOperations + Sync,
{
    pub fn new(sheets_client: SC) -> Self {
        Self {
            sheets_client,
            write_lock: Mutex::new(()),
        }
    }

    pub fn sheets_client(&self) -> &SC {
        &self.sheets_client
    }

    /// Append `records` as new rows below the table in `range`.
    ///
    /// A target without a header row first gets the batch's column union written to its
    /// header row. Otherwise rows follow the existing header, which is first extended with
    /// any fields it lacks. Header writes overwrite row 1 in place and are undone when the
    /// append fails. `written` counts data rows only.
    #[instrument(name = "Appending records", skip(self, records), fields(records = records.len()))]
    pub async fn append_records(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        records: &[Record],
    ) -> Result<AppendOutcome> {
        let batch_columns = Columns::union_of(records);
        if batch_columns.is_empty() {
            debug!("No fields in batch, nothing to append");
            return Ok(AppendOutcome { written: 0 });
        }

        let _guard = self.write_lock.lock().await;

        let metadata = self.sheets_client.get_metadata(spreadsheet_id).await?;
        let target = resolve_target(range, &metadata)?;
        let header_range = target.header_row().unwrap_or_else(|| target.clone()).to_string();
        let target = target.to_string();

        let existing_header = self
            .sheets_client
            .get_values(spreadsheet_id, &header_range)
            .await?
            .into_iter()
            .next()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()));

        // Header row as it was before this append, when the append rewrites it.
        let (columns, replaced_header) = match existing_header {
            None => {
                debug!(columns = ?batch_columns.names(), "Writing header row");
                (batch_columns, Some(Vec::new()))
            }
            Some(header) => {
                let mut columns = Columns::from_header(&header);
                match columns.extend_with(&batch_columns) {
                    0 => (columns, None),
                    added => {
                        debug!(added, "Extending header row");
                        (columns, Some(header))
                    }
                }
            }
        };

        if replaced_header.is_some() {
            self.sheets_client
                .update_values(spreadsheet_id, &header_range, &[columns.to_row()])
                .await?;
        }

        let rows = records.to_sheet_rows(&columns);
        let written = match self
            .sheets_client
            .append_values(spreadsheet_id, &target, &rows)
            .await
        {
            Ok(written) => written,
            Err(e) => {
                if let Some(previous) = replaced_header {
                    self.restore_header(spreadsheet_id, &header_range, &previous, columns.len())
                        .await;
                }
                return Err(e);
            }
        };

        info!(written, range = %target, "Records appended");

        Ok(AppendOutcome { written })
    }

    /// Put back a header row replaced ahead of a failed append, blanking the added cells.
    async fn restore_header(
        &self,
        spreadsheet_id: &str,
        header_range: &str,
        previous: &[String],
        width: usize,
    ) {
        let row: Vec<CellValue> = (0..width.max(previous.len()))
            .map(|idx| match previous.get(idx) {
                Some(cell) => CellValue::from(cell.as_str()),
                None => CellValue::empty(),
            })
            .collect();

        if let Err(e) = self
            .sheets_client
            .update_values(spreadsheet_id, header_range, &[row])
            .await
        {
            error!(error = %e, range = header_range, "Failed to restore header row");
        }
    }

    /// Read `range` as records keyed by its header row, or as raw rows.
    #[instrument(name = "Reading records", skip(self))]
    pub async fn read_records(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        format: ReadFormat,
    ) -> Result<ReadOutcome> {
        let rows = self
            .sheets_client
            .get_values(spreadsheet_id, &range.to_string())
            .await?;
        let count = rows.len();

        let data = match format {
            ReadFormat::Raw => ReadData::Raw(rows),
            ReadFormat::Objects => ReadData::Objects(Record::from_sheet_rows(&rows)),
        };

        Ok(ReadOutcome { data, count })
    }
}

/// Qualify `range` with a tab that exists in the spreadsheet.
fn resolve_target(range: &RangeSpec, metadata: &SpreadsheetMetadata) -> Result<RangeSpec> {
    match range.tab() {
        Some(tab) => match metadata.tab(tab) {
            Some(_) => Ok(range.clone()),
            None => Err(SheetError::SheetNotFound(tab.to_string()).into()),
        },
        None => match metadata.first_tab() {
            Some(tab) => Ok(RangeSpec::with_tab(&tab.title, DEFAULT_CELLS)),
            None => Err(SheetError::SheetNotFound(format!(
                "spreadsheet '{}' has no tabs",
                metadata.title
            ))
            .into()),
        },
    }
}
