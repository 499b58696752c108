//! The prediction row served by the API and persisted by the prediction store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Columns every uploaded table must carry. `observed` is read when present.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "timestamp",
    "station_id",
    "station_name",
    "lat",
    "lon",
    "pollutant",
    "prediction",
    "lower_q",
    "upper_q",
];

/// A single forecast for one station, pollutant and time.
///
/// `lower_q <= prediction <= upper_q` is expected of upstream models but is not
/// enforced; see [`PredictionRecord::interval_is_ordered`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Forecast time, serialized as `YYYY-MM-DD HH:MM:SS`.
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub station_id: String,
    pub station_name: String,
    pub lat: f64,
    pub lon: f64,
    pub pollutant: String,
    pub prediction: f64,
    /// Lower quantile of the prediction interval.
    pub lower_q: f64,
    /// Upper quantile of the prediction interval.
    pub upper_q: f64,
    /// Measured value, once known.
    pub observed: Option<f64>,
}

impl PredictionRecord {
    pub fn interval_is_ordered(&self) -> bool {
        self.lower_q <= self.prediction && self.prediction <= self.upper_q
    }

    pub fn matches_pollutant(&self, pollutant: &str) -> bool {
        self.pollutant.trim().eq_ignore_ascii_case(pollutant.trim())
    }
}

mod timestamp_format {
    use crate::utils::{parse_timestamp, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
