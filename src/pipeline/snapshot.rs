use crate::utils::{datetime_millis, millis_to_naive};
use chrono::NaiveDateTime;
use log::debug;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Names of the columns a snapshot is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotColumns {
    pub station_id: String,
    pub timestamp: String,
    pub metric: String,
    pub lat: String,
    pub lon: String,
}

impl SnapshotColumns {
    pub fn new(
        station_id: impl Into<String>,
        timestamp: impl Into<String>,
        metric: impl Into<String>,
        lat: impl Into<String>,
        lon: impl Into<String>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            timestamp: timestamp.into(),
            metric: metric.into(),
            lat: lat.into(),
            lon: lon.into(),
        }
    }
}

/// Air quality band of a pollutant reading, in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    /// Below 40.
    Good,
    /// From 40 up to (not including) 80.
    Moderate,
    /// 80 and above.
    Poor,
    /// No reading.
    Unknown,
}

impl ColorClass {
    pub fn classify(value: Option<f64>) -> Self {
        match value {
            None => ColorClass::Unknown,
            Some(v) if v.is_nan() => ColorClass::Unknown,
            Some(v) if v < 40.0 => ColorClass::Good,
            Some(v) if v < 80.0 => ColorClass::Moderate,
            Some(_) => ColorClass::Poor,
        }
    }

    /// Map marker colour as RGB.
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            ColorClass::Good => [0, 255, 0],
            ColorClass::Moderate => [255, 255, 0],
            ColorClass::Poor => [255, 0, 0],
            ColorClass::Unknown => [180, 180, 180],
        }
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorClass::Good => "good",
            ColorClass::Moderate => "moderate",
            ColorClass::Poor => "poor",
            ColorClass::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// The most recent reading of one station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationPoint {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub color_class: ColorClass,
}

impl StationPoint {
    /// Hover text for the map marker, e.g. `Station: DL001\nNO₂: 41.2 µg/m³`.
    pub fn tooltip(&self, label: &str) -> String {
        let value = match self.value {
            Some(v) if !v.is_nan() => format!("{v}"),
            _ => "n/a".to_string(),
        };
        format!("Station: {}\n{}: {} µg/m³", self.station_id, label, value)
    }
}

/// Reduces `frame` to the latest row of every station.
///
/// When a station has several rows at its latest timestamp the one appearing last in
/// the frame wins. Rows without a station or timestamp are ignored. The result is
/// ordered by station id.
///
/// # Errors
///
/// Fails when one of the named columns is missing or cannot be cast.
pub fn snapshot(frame: &DataFrame, columns: &SnapshotColumns) -> PolarsResult<Vec<StationPoint>> {
    let stations = frame.column(&columns.station_id)?.cast(&DataType::String)?;
    let timestamps = datetime_millis(frame.column(&columns.timestamp)?)?;
    let as_number = |name: &str| frame.column(name).and_then(|c| c.cast(&DataType::Float64));
    let (metric, lat, lon) = (
        as_number(&columns.metric)?,
        as_number(&columns.lat)?,
        as_number(&columns.lon)?,
    );
    let (stations, timestamps) = (stations.str()?, timestamps.i64()?);
    let (metric, lat, lon) = (metric.f64()?, lat.f64()?, lon.f64()?);

    let mut latest: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
    for (row, (station, ts)) in stations.into_iter().zip(timestamps).enumerate() {
        let (Some(station), Some(ts)) = (station, ts) else {
            continue;
        };
        match latest.get(station) {
            Some((seen, _)) if *seen > ts => {}
            _ => {
                latest.insert(station, (ts, row));
            }
        }
    }

    let points: Vec<StationPoint> = latest
        .into_iter()
        .filter_map(|(station, (ts, row))| {
            let value = metric.get(row);
            Some(StationPoint {
                station_id: station.to_string(),
                timestamp: millis_to_naive(ts)?,
                value,
                lat: lat.get(row),
                lon: lon.get(row),
                color_class: ColorClass::classify(value),
            })
        })
        .collect();
    debug!(
        "Snapshot of {} rows has {} stations",
        frame.height(),
        points.len()
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::naive_to_millis;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn columns() -> SnapshotColumns {
        SnapshotColumns::new("station", "to", "no2", "Latitude", "Longitude")
    }

    fn stations_frame(rows: &[(&str, Option<NaiveDateTime>, Option<f64>)]) -> DataFrame {
        let n = rows.len();
        DataFrame::new(vec![
            Column::new(
                "station".into(),
                rows.iter().map(|r| r.0).collect::<Vec<&str>>(),
            ),
            Column::new(
                "to".into(),
                rows.iter()
                    .map(|r| r.1.map(naive_to_millis))
                    .collect::<Vec<Option<i64>>>(),
            )
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap(),
            Column::new("no2".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
            Column::new("Latitude".into(), vec![28.6; n]),
            Column::new("Longitude".into(), vec![77.2; n]),
        ])
        .unwrap()
    }

    #[test]
    fn test_color_thresholds() {
        assert_eq!(ColorClass::classify(Some(39.9)), ColorClass::Good);
        assert_eq!(ColorClass::classify(Some(40.0)), ColorClass::Moderate);
        assert_eq!(ColorClass::classify(Some(79.9)), ColorClass::Moderate);
        assert_eq!(ColorClass::classify(Some(80.0)), ColorClass::Poor);
        assert_eq!(ColorClass::classify(None), ColorClass::Unknown);
        assert_eq!(ColorClass::classify(Some(f64::NAN)), ColorClass::Unknown);
        assert_eq!(ColorClass::classify(Some(-3.0)), ColorClass::Good);
    }

    #[test]
    fn test_rgb_matches_class() {
        assert_eq!(ColorClass::Good.rgb(), [0, 255, 0]);
        assert_eq!(ColorClass::Unknown.rgb(), [180, 180, 180]);
    }

    #[test]
    fn test_keeps_only_latest_row_per_station() {
        let df = stations_frame(&[
            ("DL002", Some(at(3, 10)), Some(90.0)),
            ("DL001", Some(at(3, 9)), Some(10.0)),
            ("DL001", Some(at(3, 11)), Some(50.0)),
            ("DL002", Some(at(3, 8)), Some(20.0)),
            ("DL001", Some(at(3, 10)), Some(30.0)),
        ]);
        let points = snapshot(&df, &columns()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].station_id, "DL001");
        assert_eq!(points[0].timestamp, at(3, 11));
        assert_eq!(points[0].value, Some(50.0));
        assert_eq!(points[0].color_class, ColorClass::Moderate);
        assert_eq!(points[1].station_id, "DL002");
        assert_eq!(points[1].value, Some(90.0));
        assert_eq!(points[1].color_class, ColorClass::Poor);
        assert_eq!(points[1].lat, Some(28.6));
    }

    #[test]
    fn test_tie_goes_to_later_row() {
        let df = stations_frame(&[
            ("DL001", Some(at(4, 0)), Some(10.0)),
            ("DL001", Some(at(4, 0)), Some(60.0)),
        ]);
        let points = snapshot(&df, &columns()).unwrap();
        assert_eq!(points[0].value, Some(60.0));
    }

    #[test]
    fn test_null_timestamps_and_values() {
        let df = stations_frame(&[
            ("DL001", None, Some(99.0)),
            ("DL001", Some(at(1, 0)), None),
            ("DL003", None, Some(5.0)),
        ]);
        let points = snapshot(&df, &columns()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, None);
        assert_eq!(points[0].color_class, ColorClass::Unknown);
    }

    #[test]
    fn test_tooltip_text() {
        let df = stations_frame(&[("DL001", Some(at(1, 0)), Some(41.5))]);
        let points = snapshot(&df, &columns()).unwrap();
        assert_eq!(points[0].tooltip("NO2"), "Station: DL001\nNO2: 41.5 µg/m³");
    }

    #[test]
    fn test_missing_metric_column() {
        let df = stations_frame(&[("DL001", Some(at(1, 0)), Some(41.5))]);
        let cols = SnapshotColumns::new("station", "to", "o3", "Latitude", "Longitude");
        assert!(snapshot(&df, &cols).is_err());
    }
}
