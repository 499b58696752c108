//! Untyped, row-oriented tables as they arrive over the wire.
//!
//! Both upload forms (a CSV blob and a list of JSON objects) are normalised into a
//! [`RawTable`] of optional cell text before validation, so the validator only has
//! one shape to check.

use crate::ingest::error::IngestError;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Builds a table from a header and rows. Rows shorter than the header are
    /// padded with empty cells, longer rows are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parses a CSV blob with a header row. Every column is read as text; typing
    /// happens during validation so errors can point at the offending cell.
    ///
    /// This is blocking; call it from `spawn_blocking` in async contexts.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, IngestError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(IngestError::EmptyInput);
        }

        let mut temp_file = NamedTempFile::new().map_err(IngestError::CsvReadIo)?;
        temp_file.write_all(bytes).map_err(IngestError::CsvReadIo)?;
        temp_file.flush().map_err(IngestError::CsvReadIo)?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
            .map_err(IngestError::CsvReadPolars)?
            .finish()
            .map_err(IngestError::CsvReadPolars)?;

        Self::from_dataframe(&df).map_err(IngestError::CsvReadPolars)
    }

    /// Converts any frame into a text table, casting each column to strings.
    pub fn from_dataframe(df: &DataFrame) -> PolarsResult<Self> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(columns.len()); df.height()];
        for name in &columns {
            let as_text = df.column(name)?.cast(&DataType::String)?;
            for (row, cell) in rows.iter_mut().zip(as_text.str()?.into_iter()) {
                row.push(cell.map(str::to_string));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from JSON objects. The header is the union of all keys in
    /// first-seen order; a key missing from a row becomes an empty cell.
    pub fn from_json_rows(objects: &[Map<String, Value>]) -> Self {
        let mut seen = BTreeSet::new();
        let mut columns = Vec::new();
        for object in objects {
            for key in object.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = objects
            .iter()
            .map(|object| {
                columns
                    .iter()
                    .map(|column| object.get(column).and_then(json_cell))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }
}

fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
