use polars::error::PolarsError;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing required columns: {}", join_columns(.missing))]
    Schema { missing: BTreeSet<String> },

    #[error("Could not parse column '{column}' at row {row} (value {value:?}): {reason}")]
    Parse {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("No rows in payload")]
    EmptyInput,

    // Errors while spooling the uploaded blob for the CSV reader
    #[error("I/O error buffering uploaded CSV data")]
    CsvReadIo(#[source] std::io::Error),

    #[error("CSV parse error: {0}")]
    CsvReadPolars(#[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

fn join_columns(columns: &BTreeSet<String>) -> String {
    columns
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl IngestError {
    /// `true` for errors caused by the uploaded content rather than by the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IngestError::TaskJoin(_) | IngestError::CsvReadIo(_))
    }
}
