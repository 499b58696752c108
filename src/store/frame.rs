//! Conversion between prediction records and their columnar form.

use crate::store::error::StoreError;
use crate::types::prediction::PredictionRecord;
use crate::utils::{datetime_millis, millis_to_naive, naive_to_millis};
use polars::prelude::*;

pub(crate) fn records_to_frame(records: &[PredictionRecord]) -> PolarsResult<DataFrame> {
    let timestamps: Vec<i64> = records.iter().map(|r| naive_to_millis(r.timestamp)).collect();
    let timestamp = Column::new("timestamp".into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let text = |name: &str, get: fn(&PredictionRecord) -> &str| {
        Column::new(name.into(), records.iter().map(get).collect::<Vec<&str>>())
    };
    let number = |name: &str, get: fn(&PredictionRecord) -> f64| {
        Column::new(name.into(), records.iter().map(get).collect::<Vec<f64>>())
    };

    DataFrame::new(vec![
        timestamp,
        text("station_id", |r| r.station_id.as_str()),
        text("station_name", |r| r.station_name.as_str()),
        number("lat", |r| r.lat),
        number("lon", |r| r.lon),
        text("pollutant", |r| r.pollutant.as_str()),
        number("prediction", |r| r.prediction),
        number("lower_q", |r| r.lower_q),
        number("upper_q", |r| r.upper_q),
        Column::new(
            "observed".into(),
            records.iter().map(|r| r.observed).collect::<Vec<Option<f64>>>(),
        ),
    ])
}

pub(crate) fn frame_to_records(df: &DataFrame) -> Result<Vec<PredictionRecord>, StoreError> {
    let timestamp = datetime_millis(df.column("timestamp")?)?;
    let timestamp = timestamp.i64()?;

    let as_text = |name: &str| df.column(name).and_then(|c| c.cast(&DataType::String));
    let as_number = |name: &str| df.column(name).and_then(|c| c.cast(&DataType::Float64));

    let station_id = as_text("station_id")?;
    let station_name = as_text("station_name")?;
    let pollutant = as_text("pollutant")?;
    let lat = as_number("lat")?;
    let lon = as_number("lon")?;
    let prediction = as_number("prediction")?;
    let lower_q = as_number("lower_q")?;
    let upper_q = as_number("upper_q")?;
    let observed = as_number("observed")?;

    let (station_id, station_name, pollutant) =
        (station_id.str()?, station_name.str()?, pollutant.str()?);
    let (lat, lon, prediction, lower_q, upper_q, observed) = (
        lat.f64()?,
        lon.f64()?,
        prediction.f64()?,
        lower_q.f64()?,
        upper_q.f64()?,
        observed.f64()?,
    );

    (0..df.height())
        .map(|row| {
            let missing = |column: &str| StoreError::Corrupt {
                message: format!("null '{column}' at row {row}"),
            };
            let timestamp = timestamp
                .get(row)
                .and_then(millis_to_naive)
                .ok_or_else(|| missing("timestamp"))?;
            Ok(PredictionRecord {
                timestamp,
                station_id: station_id.get(row).ok_or_else(|| missing("station_id"))?.to_string(),
                station_name: station_name
                    .get(row)
                    .ok_or_else(|| missing("station_name"))?
                    .to_string(),
                lat: lat.get(row).ok_or_else(|| missing("lat"))?,
                lon: lon.get(row).ok_or_else(|| missing("lon"))?,
                pollutant: pollutant.get(row).ok_or_else(|| missing("pollutant"))?.to_string(),
                prediction: prediction.get(row).ok_or_else(|| missing("prediction"))?,
                lower_q: lower_q.get(row).ok_or_else(|| missing("lower_q"))?,
                upper_q: upper_q.get(row).ok_or_else(|| missing("upper_q"))?,
                observed: observed.get(row),
            })
        })
        .collect()
}
