use crate::sheets::types::{SheetEntry, SpreadsheetResponse};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpreadsheetMetadata {
    pub title: String,
    pub tabs: Vec<Tab>,
}

impl SpreadsheetMetadata {
    pub fn tab(&self, title: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.title == title)
    }

    pub fn first_tab(&self) -> Option<&Tab> {
        self.tabs.first()
    }
}

impl From<SpreadsheetResponse> for SpreadsheetMetadata {
    fn from(response: SpreadsheetResponse) -> Self {
        SpreadsheetMetadata {
            title: response.properties.title,
            tabs: response.sheets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub title: String,
    pub id: i64,
    pub row_count: u32,
    pub column_count: u32,
}

impl From<SheetEntry> for Tab {
    fn from(entry: SheetEntry) -> Self {
        let grid = entry.properties.grid_properties.unwrap_or_default();
        Tab {
            title: entry.properties.title,
            id: entry.properties.sheet_id,
            row_count: grid.row_count,
            column_count: grid.column_count,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    pub(crate) fn mock_metadata(tabs: &[&str]) -> SpreadsheetMetadata {
        SpreadsheetMetadata {
            title: "Team lists".to_string(),
            tabs: tabs
                .iter()
                .enumerate()
                .map(|(idx, title)| Tab {
                    title: title.to_string(),
                    id: idx as i64,
                    row_count: 1000,
                    column_count: 26,
                })
                .collect(),
        }
    }
}
