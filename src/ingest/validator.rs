//! Gates uploads on the required-column schema and types every cell.

use crate::ingest::error::IngestError;
use crate::ingest::raw_table::RawTable;
use crate::types::prediction::{PredictionRecord, REQUIRED_COLUMNS};
use crate::utils::parse_timestamp;
use chrono::NaiveDateTime;
use log::warn;
use std::collections::BTreeSet;

/// A table that passed validation and is safe to hand to the prediction store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedTable {
    records: Vec<PredictionRecord>,
}

impl ValidatedTable {
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PredictionRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Column positions of the prediction fields within a [`RawTable`].
struct ColumnMap {
    timestamp: usize,
    station_id: usize,
    station_name: usize,
    lat: usize,
    lon: usize,
    pollutant: usize,
    prediction: usize,
    lower_q: usize,
    upper_q: usize,
    observed: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, IngestError> {
        let missing: BTreeSet<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| table.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::Schema { missing });
        }

        // Every required column was found above.
        let index = |name: &str| table.column_index(name).unwrap_or_default();
        Ok(Self {
            timestamp: index("timestamp"),
            station_id: index("station_id"),
            station_name: index("station_name"),
            lat: index("lat"),
            lon: index("lon"),
            pollutant: index("pollutant"),
            prediction: index("prediction"),
            lower_q: index("lower_q"),
            upper_q: index("upper_q"),
            observed: table.column_index("observed"),
        })
    }
}

/// Checks `table` against the prediction schema and converts it into typed records.
///
/// Column presence is checked first and every missing column is reported at once.
/// Cells are then parsed in row-major order and the first bad cell is reported
/// with its row index, column and raw text. Extra columns are ignored.
///
/// # Errors
///
/// * [`IngestError::Schema`] if any required column is absent.
/// * [`IngestError::EmptyInput`] if the table has no data rows.
/// * [`IngestError::Parse`] for an unparseable timestamp or number, or an empty
///   required cell.
pub fn validate(table: RawTable) -> Result<ValidatedTable, IngestError> {
    let columns = ColumnMap::resolve(&table)?;
    if table.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let mut records = Vec::with_capacity(table.len());
    for (row_index, row) in table.rows().iter().enumerate() {
        let cells = RowCells {
            row_index,
            row,
            header: table.columns(),
        };
        records.push(PredictionRecord {
            timestamp: cells.timestamp(columns.timestamp)?,
            station_id: cells.text(columns.station_id)?,
            station_name: cells.text(columns.station_name)?,
            lat: cells.number(columns.lat)?,
            lon: cells.number(columns.lon)?,
            pollutant: cells.text(columns.pollutant)?,
            prediction: cells.number(columns.prediction)?,
            lower_q: cells.number(columns.lower_q)?,
            upper_q: cells.number(columns.upper_q)?,
            observed: match columns.observed {
                Some(idx) => cells.optional_number(idx)?,
                None => None,
            },
        });
    }

    let unordered = records.iter().filter(|r| !r.interval_is_ordered()).count();
    if unordered > 0 {
        warn!(
            "{} of {} prediction rows have an interval not satisfying lower_q <= prediction <= upper_q",
            unordered,
            records.len()
        );
    }

    Ok(ValidatedTable { records })
}

struct RowCells<'a> {
    row_index: usize,
    row: &'a [Option<String>],
    header: &'a [String],
}

impl RowCells<'_> {
    fn raw(&self, idx: usize) -> Option<&str> {
        self.row
            .get(idx)
            .and_then(|cell| cell.as_deref())
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
    }

    fn error(&self, idx: usize, value: &str, reason: impl ToString) -> IngestError {
        IngestError::Parse {
            row: self.row_index,
            column: self.header.get(idx).cloned().unwrap_or_default(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn required(&self, idx: usize) -> Result<&str, IngestError> {
        self.raw(idx)
            .ok_or_else(|| self.error(idx, "", "required value is empty"))
    }

    fn text(&self, idx: usize) -> Result<String, IngestError> {
        self.required(idx).map(str::to_string)
    }

    fn timestamp(&self, idx: usize) -> Result<NaiveDateTime, IngestError> {
        let raw = self.required(idx)?;
        parse_timestamp(raw).map_err(|e| self.error(idx, raw, e))
    }

    fn number(&self, idx: usize) -> Result<f64, IngestError> {
        let raw = self.required(idx)?;
        self.finite(idx, raw)
    }

    fn optional_number(&self, idx: usize) -> Result<Option<f64>, IngestError> {
        match self.raw(idx) {
            None => Ok(None),
            Some(raw) if raw.eq_ignore_ascii_case("nan") => Ok(None),
            Some(raw) => self.finite(idx, raw).map(Some),
        }
    }

    /// Parses a float, rejecting NaN and infinities since they cannot be served as JSON numbers.
    fn finite(&self, idx: usize, raw: &str) -> Result<f64, IngestError> {
        let value = raw.parse::<f64>().map_err(|e| self.error(idx, raw, e))?;
        if !value.is_finite() {
            return Err(self.error(idx, raw, "value is not finite"));
        }
        Ok(value)
    }
}
