pub mod error;
pub mod raw_table;
pub mod validator;

use crate::ingest::error::IngestError;
use crate::ingest::raw_table::RawTable;
use crate::ingest::validator::{validate, ValidatedTable};
use serde_json::{Map, Value};
use tokio::task;

/// Parses and validates an uploaded CSV blob off the async runtime.
pub async fn validate_csv(bytes: Vec<u8>) -> Result<ValidatedTable, IngestError> {
    task::spawn_blocking(move || validate(RawTable::from_csv_bytes(&bytes)?)).await?
}

/// Validates a JSON upload. An absent or empty row list is [`IngestError::EmptyInput`].
pub fn validate_json(rows: Option<Vec<Map<String, Value>>>) -> Result<ValidatedTable, IngestError> {
    match rows {
        Some(rows) if !rows.is_empty() => validate(RawTable::from_json_rows(&rows)),
        _ => Err(IngestError::EmptyInput),
    }
}
