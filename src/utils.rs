use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::info;
use polars::prelude::{Column, DataType, PolarsResult, TimeUnit};
use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "aircast";

/// Transport format for prediction timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the store's last-update marker (ISO-8601, microseconds, no offset).
pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub async fn ensure_data_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Data path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating data directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

/// Current instant as a naive UTC datetime.
pub fn now_naive_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Parses a timezone-naive timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS[.f]]` with a space or `T` separator, a bare
/// `YYYY-MM-DD` (midnight) and RFC 3339 with an offset, which is converted to UTC.
/// On failure the error describes why the most common layout did not match.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_utc());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
}

pub fn millis_to_naive(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

pub fn naive_to_millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

/// The column's instants as epoch milliseconds (`Int64`), whatever its temporal unit.
pub(crate) fn datetime_millis(column: &Column) -> PolarsResult<Column> {
    column
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_common_layouts() {
        let expected = at(2024, 1, 15, 13, 30, 0);
        assert_eq!(parse_timestamp("2024-01-15 13:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15T13:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15 13:30").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2024-01-15T13:30 ").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-15").unwrap(),
            at(2024, 1, 15, 0, 0, 0)
        );
    }

    #[test]
    fn test_parse_fractional_and_offset() {
        let parsed = parse_timestamp("2024-01-15 13:30:00.250").unwrap();
        assert_eq!(parsed.and_utc().timestamp_subsec_millis(), 250);
        assert_eq!(
            parse_timestamp("2024-01-15T15:30:00+02:00").unwrap(),
            at(2024, 1, 15, 13, 30, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(parse_timestamp("2024-13-45 10:00:00").is_err());
    }

    #[test]
    fn test_millis_round_trip() {
        let ts = at(2023, 6, 1, 8, 0, 0);
        assert_eq!(millis_to_naive(naive_to_millis(ts)), Some(ts));
    }

    #[tokio::test]
    async fn test_ensure_data_dir_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_data_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());
        // second call is a no-op
        ensure_data_dir_exists(&nested).await.unwrap();
    }
}
