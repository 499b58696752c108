//! The per-tab data behind the dashboard.
//!
//! Every view takes the current [`DashboardState`] explicitly and returns plain
//! frames or points; rendering is left to the caller.

use crate::dashboard::error::DashboardError;
use crate::dashboard::state::DashboardState;
use crate::pipeline::resample::{melt, LongPoint, ResampleExt};
use crate::pipeline::snapshot::{snapshot, SnapshotColumns, StationPoint};
use crate::sources::data_source::DataSource;
use crate::sources::loader::SourceLoader;
use crate::types::pollutant::Pollutant;
use log::debug;
use polars::prelude::*;
use std::collections::HashSet;

const STATION_COLUMN: &str = "station";
const LATITUDE_COLUMN: &str = "Latitude";
const LONGITUDE_COLUMN: &str = "Longitude";

pub struct Dashboard {
    loader: SourceLoader,
}

impl Dashboard {
    pub fn new(loader: SourceLoader) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    /// Re-reads the underlying sources.
    pub async fn refresh(&mut self) -> Result<(), DashboardError> {
        Ok(self.loader.refresh().await?)
    }

    /// City-wide trend of the selected pollutant.
    pub fn pollution_trend(&self, state: &DashboardState) -> Result<DataFrame, DashboardError> {
        let frame = self.loader.frame(DataSource::Trends)?;
        let time = self.loader.time_column(DataSource::Trends)?;
        let value = state.pollutant.trend_column();

        let trend = frame
            .lazy()
            .filter(col(time).is_not_null().and(col(value).is_not_null()))
            .filter_resample(time, &[value], state.scope, state.granularity)?;
        Ok(trend)
    }

    /// Latest reading of every station, coloured by the selected pollutant.
    pub fn station_map(&self, state: &DashboardState) -> Result<Vec<StationPoint>, DashboardError> {
        let frame = self.loader.frame(DataSource::Stations)?;
        let columns = SnapshotColumns::new(
            STATION_COLUMN,
            self.loader.time_column(DataSource::Stations)?,
            state.pollutant.map_column(),
            LATITUDE_COLUMN,
            LONGITUDE_COLUMN,
        );
        Ok(snapshot(&frame, &columns)?)
    }

    /// Trend of the selected weather variable in its display unit.
    pub fn weather_trend(&self, state: &DashboardState) -> Result<DataFrame, DashboardError> {
        let frame = self.loader.frame(DataSource::Weather)?;
        let time = self.loader.time_column(DataSource::Weather)?;
        let variable = state.weather_variable;
        let column = variable.column();

        let mut trend =
            frame
                .lazy()
                .filter_resample(time, &[column], state.scope, state.granularity)?;
        let converted = trend
            .column(column)?
            .f64()?
            .apply_values(|raw| variable.convert(raw))
            .into_column();
        trend.with_column(converted)?;
        Ok(trend)
    }

    /// Distinct forecast stations in order of first appearance.
    pub fn forecast_stations(&self) -> Result<Vec<String>, DashboardError> {
        let frame = self.loader.frame(DataSource::Forecast)?;
        let stations = frame.column(STATION_COLUMN)?.cast(&DataType::String)?;
        let mut seen = HashSet::new();
        Ok(stations
            .str()?
            .into_iter()
            .flatten()
            .filter(|station| seen.insert(*station))
            .map(str::to_string)
            .collect())
    }

    /// Predicted NO2 and O3 of one station, one column per pollutant.
    ///
    /// Only rows where both predictions are present are used.
    pub fn forecast_trend(&self, state: &DashboardState) -> Result<DataFrame, DashboardError> {
        let station = match &state.station {
            Some(station) => Some(station.clone()),
            None => self.forecast_stations()?.into_iter().next(),
        };
        debug!("Forecast trend for station {:?}", station);

        let frame = self.loader.frame(DataSource::Forecast)?;
        let time = self.loader.time_column(DataSource::Forecast)?;
        let columns = Pollutant::ALL.map(|p| p.forecast_column());
        let selected = match station {
            Some(station) => col(STATION_COLUMN).cast(DataType::String).eq(lit(station)),
            None => lit(false),
        };
        let complete = columns
            .iter()
            .fold(selected, |acc, c| acc.and(col(*c).is_not_null()));

        let trend = frame
            .lazy()
            .filter(complete)
            .filter_resample(time, &columns, state.scope, state.granularity)?;
        Ok(trend)
    }

    /// [`Dashboard::forecast_trend`] as long `(timestamp, series, value)` rows.
    pub fn forecast_long(&self, state: &DashboardState) -> Result<Vec<LongPoint>, DashboardError> {
        Ok(melt(&self.forecast_trend(state)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::resample::series_points;
    use crate::pipeline::snapshot::ColorClass;
    use crate::sources::data_source::SourceSpecs;
    use crate::types::granularity::Granularity;
    use crate::types::scope::FilterScope;
    use crate::types::weather_variable::WeatherVariable;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::Path;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn write_fixtures(dir: &Path) {
        std::fs::write(
            dir.join("stations.csv"),
            "station,to,no2,o3,Latitude,Longitude\n\
             Anand Vihar,2024-11-03 08:00:00,95.0,20.0,28.65,77.31\n\
             Anand Vihar,2024-11-03 09:00:00,85.0,22.0,28.65,77.31\n\
             ITO,2024-11-03 09:00:00,35.0,50.0,28.63,77.24\n\
             Lodhi Road,2024-11-03 07:00:00,,41.0,28.59,77.22\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("forgraphs.csv"),
            "to date,no2,ozone\n\
             2024-11-01 00:00:00,10,5\n\
             2024-11-01 00:30:00,20,\n\
             2024-11-01 01:00:00,,7\n\
             2024-11-02 00:00:00,40,9\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("weather.csv"),
            "valid_time,latitude,longitude,t2m,sp\n\
             2024-11-01 00:00:00,28.5,77.0,300.15,1.01\n\
             2024-11-01 00:00:00,28.75,77.25,302.15,1.02\n\
             2024-11-01 01:00:00,28.5,77.0,299.15,1.00\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("forecast.csv"),
            "timestamp,station,pred_no2,pred_o3\n\
             2024-11-03 00:00:00,ITO,50,20\n\
             2024-11-03 00:00:00,Anand Vihar,90,15\n\
             2024-11-03 01:00:00,ITO,60,\n\
             2024-11-03 02:00:00,ITO,70,30\n",
        )
        .unwrap();
    }

    async fn dashboard(dir: &Path) -> Dashboard {
        write_fixtures(dir);
        let loader = SourceLoader::load(SourceSpecs::defaults(dir)).await.unwrap();
        Dashboard::new(loader)
    }

    fn all_hourly() -> DashboardState {
        DashboardState::builder()
            .scope(FilterScope::AllTime)
            .granularity(Granularity::Hourly)
            .build()
    }

    #[tokio::test]
    async fn test_pollution_trend_drops_missing_values() {
        let tmp = tempfile::tempdir().unwrap();
        let dashboard = dashboard(tmp.path()).await;

        let trend = dashboard.pollution_trend(&all_hourly()).unwrap();
        assert_eq!(trend.get_column_names_str(), ["timestamp", "no2"]);
        assert_eq!(
            series_points(&trend, "no2").unwrap(),
            vec![(at(1, 0), Some(15.0)), (at(2, 0), Some(40.0))]
        );

        let ozone = DashboardState::builder()
            .pollutant(Pollutant::O3)
            .granularity(Granularity::Daily)
            .build();
        let trend = dashboard.pollution_trend(&ozone).unwrap();
        assert_eq!(
            series_points(&trend, "ozone").unwrap(),
            vec![(at(1, 0), Some(6.0)), (at(2, 0), Some(9.0))]
        );
    }

    #[tokio::test]
    async fn test_station_map_uses_latest_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let dashboard = dashboard(tmp.path()).await;

        let points = dashboard.station_map(&DashboardState::default()).unwrap();
        let summary: Vec<(&str, ColorClass)> = points
            .iter()
            .map(|p| (p.station_id.as_str(), p.color_class))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Anand Vihar", ColorClass::Poor),
                ("ITO", ColorClass::Good),
                ("Lodhi Road", ColorClass::Unknown)
            ]
        );
        assert_eq!(points[1].lon, Some(77.24));
    }

    #[tokio::test]
    async fn test_weather_temperature_in_celsius() {
        let tmp = tempfile::tempdir().unwrap();
        let dashboard = dashboard(tmp.path()).await;

        let trend = dashboard.weather_trend(&all_hourly()).unwrap();
        let points = series_points(&trend, "t2m").unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[0].1.unwrap() - 28.0).abs() < 1e-9);
        assert!((points[1].1.unwrap() - 26.0).abs() < 1e-9);

        let pressure = DashboardState::builder()
            .scope(FilterScope::AllTime)
            .weather_variable(WeatherVariable::SurfacePressure)
            .build();
        let trend = dashboard.weather_trend(&pressure).unwrap();
        let points = series_points(&trend, "sp").unwrap();
        assert!((points[0].1.unwrap() - 1.015).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_forecast_views() {
        let tmp = tempfile::tempdir().unwrap();
        let dashboard = dashboard(tmp.path()).await;

        assert_eq!(dashboard.forecast_stations().unwrap(), ["ITO", "Anand Vihar"]);

        // defaults to the first station
        let trend = dashboard.forecast_trend(&all_hourly()).unwrap();
        assert_eq!(trend.get_column_names_str(), ["timestamp", "pred_no2", "pred_o3"]);
        assert_eq!(
            series_points(&trend, "pred_no2").unwrap(),
            vec![(at(3, 0), Some(50.0)), (at(3, 2), Some(70.0))]
        );

        let state = DashboardState::builder()
            .scope(FilterScope::AllTime)
            .station("Anand Vihar")
            .build();
        let long = dashboard.forecast_long(&state).unwrap();
        assert_eq!(long.len(), 2);
        assert_eq!(long[0].series, "pred_no2");
        assert_eq!(long[0].value, Some(90.0));
        assert_eq!(long[1].series, "pred_o3");
        assert_eq!(long[1].value, Some(15.0));

        let unknown = DashboardState::builder().station("Nowhere").build();
        assert_eq!(dashboard.forecast_trend(&unknown).unwrap().height(), 0);
    }

    #[tokio::test]
    async fn test_missing_source_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixtures(tmp.path());
        let specs = SourceSpecs::defaults(tmp.path()).only(&[DataSource::Weather]);
        let dashboard = Dashboard::new(SourceLoader::load(specs).await.unwrap());
        let err = dashboard.pollution_trend(&DashboardState::default()).unwrap_err();
        assert!(matches!(err, DashboardError::Source(_)));
    }
}
