use crate::error::{AppError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// The value as the sheet renders it back.
    pub fn to_cell_string(&self) -> String {
        match self {
            CellValue::Bool(b) => match b {
                true => "TRUE".to_string(),
                false => "FALSE".to_string(),
            },
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n.into())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n.into())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl TryFrom<serde_json::Value> for CellValue {
    type Error = String;

    fn try_from(value: serde_json::Value) -> std::result::Result<Self, Self::Error> {
        match value {
            serde_json::Value::Bool(b) => Ok(CellValue::Bool(b)),
            serde_json::Value::Number(n) => Ok(CellValue::Number(n)),
            serde_json::Value::String(s) => Ok(CellValue::Text(s)),
            serde_json::Value::Null => Err("null is not a cell value".to_string()),
            serde_json::Value::Array(_) => Err("arrays are not cell values".to_string()),
            serde_json::Value::Object(_) => Err("objects are not cell values".to_string()),
        }
    }
}

/// Field-keyed record. Keys are unique; first insertion order is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field`, replacing any previous value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a JSON object into a record, rejecting non-scalar values.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let map = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(AppError::Validation(format!(
                    "record must be a JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };

        let mut record = Record::new();
        for (field, value) in map {
            let cell = CellValue::try_from(value)
                .map_err(|e| AppError::Validation(format!("field '{}': {}", field, e)))?;
            record.insert(field, cell);
        }
        Ok(record)
    }

    /// Parse a JSON array of objects into a batch of records.
    pub fn batch_from_json(value: serde_json::Value) -> Result<Vec<Self>> {
        let items = match value {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(AppError::Validation(format!(
                    "records must be a JSON array, got {}",
                    json_type_name(&other)
                )));
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                Record::from_json(item).map_err(|e| match e {
                    AppError::Validation(msg) => {
                        AppError::Validation(format!("record {}: {}", idx, msg))
                    }
                    other => other,
                })
            })
            .collect()
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// Ordered column names: a header row, or the column union of a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Columns(Vec<String>);

impl Columns {
    pub fn from_header(header: &[String]) -> Self {
        Columns(header.to_vec())
    }

    /// Union of the batch's field names, each positioned at its first appearance.
    pub fn union_of(records: &[Record]) -> Self {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for name in records.iter().flat_map(Record::field_names) {
            if seen.insert(name) {
                names.push(name.to_string());
            }
        }
        Columns(names)
    }

    /// Append the columns of `other` missing from `self`, returning how many were added.
    pub fn extend_with(&mut self, other: &Columns) -> usize {
        let before = self.0.len();
        for name in &other.0 {
            if !self.0.contains(name) {
                self.0.push(name.clone());
            }
        }
        self.0.len() - before
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_row(&self) -> Vec<CellValue> {
        self.0.iter().map(|name| CellValue::Text(name.clone())).collect()
    }

    /// Project `record` onto the columns, filling absent fields with an empty string.
    pub fn project(&self, record: &Record) -> Vec<CellValue> {
        self.0
            .iter()
            .map(|name| record.get(name).cloned().unwrap_or_else(CellValue::empty))
            .collect()
    }

    /// Zip a row against the columns.
    ///
    /// Missing trailing cells become empty strings and cells beyond the last column are
    /// dropped. Blank column names do not produce fields.
    pub fn zip(&self, row: &[String]) -> Record {
        let mut record = Record::new();
        for (idx, name) in self.0.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let cell = row.get(idx).cloned().unwrap_or_default();
            record.insert(name.clone(), cell);
        }
        record
    }
}

pub trait FromSheetRows: Sized {
    /// Convert rows (first row as headers) to a list of values.
    fn from_sheet_rows(rows: &[Vec<String>]) -> Vec<Self>;
}

pub trait ToSheetRows {
    /// Convert values to rows aligned to `columns`, without a header row.
    fn to_sheet_rows(&self, columns: &Columns) -> Vec<Vec<CellValue>>;
}

impl FromSheetRows for Record {
    fn from_sheet_rows(rows: &[Vec<String>]) -> Vec<Self> {
        let Some((header, data)) = rows.split_first() else {
            return Vec::new();
        };

        let columns = Columns::from_header(header);
        data.iter().map(|row| columns.zip(row)).collect()
    }
}

impl ToSheetRows for [Record] {
    fn to_sheet_rows(&self, columns: &Columns) -> Vec<Vec<CellValue>> {
        self.iter().map(|record| columns.project(record)).collect()
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    pub(crate) fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::strings;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_column_union_orders_by_first_occurrence() {
        let records = vec![
            Record::from_iter([("a", 1), ("b", 2)]),
            Record::from_iter([("b", 3), ("c", 4)]),
        ];

        let columns = Columns::union_of(&records);
        assert_eq!(columns.names(), strings(&["a", "b", "c"]));

        let rows = records.as_slice().to_sheet_rows(&columns);
        assert_eq!(
            rows,
            vec![
                vec![CellValue::from(1), CellValue::from(2), CellValue::empty()],
                vec![CellValue::empty(), CellValue::from(3), CellValue::from(4)],
            ]
        );
    }

    #[test]
    fn test_column_union_follows_record_iteration_order() {
        let records = vec![
            Record::from_iter([("z", "1"), ("m", "2")]),
            Record::from_iter([("a", "3"), ("z", "4")]),
        ];

        assert_eq!(Columns::union_of(&records).names(), strings(&["z", "m", "a"]));
    }

    #[test]
    fn test_absent_fields_filled_with_empty_string() {
        let records = vec![
            Record::from_iter([("a", 1)]),
            Record::from_iter([("a", 2), ("b", 3)]),
        ];

        let columns = Columns::union_of(&records);
        let rows = records.as_slice().to_sheet_rows(&columns);

        assert_eq!(
            rows,
            vec![
                vec![CellValue::from(1), CellValue::empty()],
                vec![CellValue::from(2), CellValue::from(3)],
            ]
        );
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::from_iter([("a", "1"), ("b", "2")]);
        record.insert("a", "3");

        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&CellValue::from("3")));
    }

    #[test]
    fn test_extend_with_keeps_existing_order() {
        let mut header = Columns::from_header(&strings(&["name", "email"]));
        let batch = Columns::from_header(&strings(&["email", "phone", "name", "city"]));

        assert_eq!(header.extend_with(&batch), 2);
        assert_eq!(header.names(), strings(&["name", "email", "phone", "city"]));
    }

    #[test]
    fn test_from_sheet_rows_pads_and_truncates() {
        let rows = vec![
            strings(&["a", "b", "c"]),
            strings(&["1"]),
            strings(&["1", "2", "3", "overflow"]),
        ];

        let records = Record::from_sheet_rows(&rows);
        assert_eq!(
            records,
            vec![
                Record::from_iter([("a", "1"), ("b", ""), ("c", "")]),
                Record::from_iter([("a", "1"), ("b", "2"), ("c", "3")]),
            ]
        );
    }

    #[test]
    fn test_from_sheet_rows_headers_only() {
        let rows = vec![strings(&["a", "b"])];
        assert_eq!(Record::from_sheet_rows(&rows), vec![]);
    }

    #[test]
    fn test_from_sheet_rows_empty() {
        assert_eq!(Record::from_sheet_rows(&[]), vec![]);
    }

    #[test]
    fn test_blank_header_cells_are_skipped() {
        let rows = vec![strings(&["a", "", "c"]), strings(&["1", "2", "3"])];

        assert_eq!(
            Record::from_sheet_rows(&rows),
            vec![Record::from_iter([("a", "1"), ("c", "3")])]
        );
    }

    #[test]
    fn test_record_from_json_keeps_key_order() {
        let record = Record::from_json(json!({"zeta": "z", "alpha": 1, "flag": true})).unwrap();

        assert_eq!(
            record.field_names().collect::<Vec<_>>(),
            vec!["zeta", "alpha", "flag"]
        );
        assert_eq!(record.get("flag"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_record_from_json_rejects_nested_values() {
        let err = Record::from_json(json!({"a": {"nested": 1}})).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("field 'a'")));

        let err = Record::from_json(json!({"a": null})).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_batch_from_json_reports_offending_record() {
        let err = Record::batch_from_json(json!([{"a": 1}, ["not", "an", "object"]])).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.starts_with("record 1:")));

        let err = Record::batch_from_json(json!({"a": 1})).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_record_serializes_as_ordered_object() {
        let record = Record::from_iter([("b", CellValue::from("x")), ("a", CellValue::from(2))]);
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"b":"x","a":2}"#);
    }

    #[test]
    fn test_cell_string_rendering() {
        assert_eq!(CellValue::from(42).to_cell_string(), "42");
        assert_eq!(CellValue::from(true).to_cell_string(), "TRUE");
        assert_eq!(CellValue::from("text").to_cell_string(), "text");
    }
}
