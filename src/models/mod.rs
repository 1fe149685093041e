pub mod range;
pub mod record;
pub mod spreadsheet;

pub use range::{DEFAULT_CELLS, RangeSpec};
pub use record::{CellValue, Columns, FromSheetRows, Record, ToSheetRows};
pub use spreadsheet::{SpreadsheetMetadata, Tab};
