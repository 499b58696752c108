use crate::sources::data_source::{DataSource, SourceSpec, SourceSpecs};
use crate::sources::error::SourceError;
use crate::utils::{naive_to_millis, parse_timestamp};
use log::{info, warn};
use polars::prelude::*;
use std::collections::BTreeMap;
use tokio::task;

/// Reads the dashboard's CSV extracts once and hands out copies of them.
///
/// Nothing is re-read until [`SourceLoader::refresh`] is called.
pub struct SourceLoader {
    specs: SourceSpecs,
    frames: BTreeMap<DataSource, DataFrame>,
}

impl SourceLoader {
    /// Reads every source in `specs`.
    ///
    /// # Errors
    ///
    /// Fails on the first source that cannot be read or has no time column.
    pub async fn load(specs: SourceSpecs) -> Result<Self, SourceError> {
        let frames = Self::read_all(&specs).await?;
        Ok(Self { specs, frames })
    }

    /// Re-reads every source. On failure the previously loaded frames are kept.
    pub async fn refresh(&mut self) -> Result<(), SourceError> {
        self.frames = Self::read_all(&self.specs).await?;
        info!("Refreshed {} data sources", self.frames.len());
        Ok(())
    }

    pub fn specs(&self) -> &SourceSpecs {
        &self.specs
    }

    /// A copy of the loaded frame for `source`.
    pub fn frame(&self, source: DataSource) -> Result<DataFrame, SourceError> {
        self.frames
            .get(&source)
            .cloned()
            .ok_or(SourceError::NotLoaded(source))
    }

    /// The name under which `source` exposes its timestamps.
    pub fn time_column(&self, source: DataSource) -> Result<&str, SourceError> {
        self.specs
            .get(source)
            .map(|spec| spec.time_column.as_str())
            .ok_or(SourceError::NotLoaded(source))
    }

    async fn read_all(specs: &SourceSpecs) -> Result<BTreeMap<DataSource, DataFrame>, SourceError> {
        let mut frames = BTreeMap::new();
        for (source, spec) in specs.iter() {
            let df = read_source(source, spec.clone()).await?;
            info!(
                "Loaded {} {} rows from {}",
                df.height(),
                source,
                spec.path.display()
            );
            frames.insert(source, df);
        }
        Ok(frames)
    }
}

async fn read_source(source: DataSource, spec: SourceSpec) -> Result<DataFrame, SourceError> {
    task::spawn_blocking(move || {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(spec.path.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| SourceError::Read {
                source_kind: source,
                path: spec.path.clone(),
                source: e,
            })?;
        coerce_time_column(df, source, &spec)
    })
    .await?
}

/// Exposes the spec's time column as `Datetime[ms]`. Text that does not parse as a
/// timestamp becomes null.
fn coerce_time_column(
    mut df: DataFrame,
    source: DataSource,
    spec: &SourceSpec,
) -> Result<DataFrame, SourceError> {
    let candidates = spec.time_column_candidates();
    let Some(found) = candidates
        .iter()
        .find(|name| df.column(name).is_ok())
        .copied()
    else {
        return Err(SourceError::MissingTimeColumn {
            source_kind: source,
            path: spec.path.clone(),
            candidates: candidates.join(", "),
        });
    };

    let coerce = |column: &Column| -> PolarsResult<Column> {
        let datetime = DataType::Datetime(TimeUnit::Milliseconds, None);
        match column.dtype() {
            DataType::String => {
                let millis: Vec<Option<i64>> = column
                    .str()?
                    .into_iter()
                    .map(|raw| raw.and_then(|s| parse_timestamp(s).ok()).map(naive_to_millis))
                    .collect();
                Column::new(spec.time_column.as_str().into(), millis).cast(&datetime)
            }
            _ => Ok(column
                .cast(&datetime)?
                .with_name(spec.time_column.as_str().into())),
        }
    };

    let original = df
        .column(found)
        .map_err(|e| SourceError::TimeCoercion(source, e))?;
    let coerced = coerce(original).map_err(|e| SourceError::TimeCoercion(source, e))?;
    let dropped = coerced.null_count().saturating_sub(original.null_count());
    if dropped > 0 {
        warn!(
            "{} of {} timestamps in {} could not be parsed and were set to null",
            dropped,
            df.height(),
            spec.path.display()
        );
    }

    df.with_column(coerced)
        .map_err(|e| SourceError::TimeCoercion(source, e))?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn test_loads_and_coerces_time_columns() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "weather.csv",
            "valid_time,t2m\n2024-01-01 00:00:00,280.0\nnot a date,281.0\n2024-01-01T02:00,282.5\n",
        );
        let specs = SourceSpecs::defaults(tmp.path()).only(&[DataSource::Weather]);
        let loader = SourceLoader::load(specs).await.unwrap();

        let df = loader.frame(DataSource::Weather).unwrap();
        assert_eq!(df.height(), 3);
        let time = df.column("valid_time").unwrap();
        assert!(matches!(
            time.dtype(),
            DataType::Datetime(TimeUnit::Milliseconds, None)
        ));
        assert_eq!(time.null_count(), 1);
        assert_eq!(loader.time_column(DataSource::Weather).unwrap(), "valid_time");
    }

    #[tokio::test]
    async fn test_trends_fall_back_to_plain_to_column() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "forgraphs.csv", "to,no2,ozone\n2024-01-01 00:00,30,12\n");
        let specs = SourceSpecs::defaults(tmp.path()).only(&[DataSource::Trends]);
        let loader = SourceLoader::load(specs).await.unwrap();

        let df = loader.frame(DataSource::Trends).unwrap();
        assert!(df.column("to date").is_ok());
        assert_eq!(df.column("to date").unwrap().null_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_time_column() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "forecast.csv", "when,pred_no2\n2024-01-01,3\n");
        let specs = SourceSpecs::defaults(tmp.path()).only(&[DataSource::Forecast]);
        let err = SourceLoader::load(specs).await.err().unwrap();
        assert!(matches!(err, SourceError::MissingTimeColumn { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_a_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let specs = SourceSpecs::defaults(tmp.path()).only(&[DataSource::Stations]);
        let err = SourceLoader::load(specs).await.err().unwrap();
        assert!(matches!(err, SourceError::Read { .. }));
    }

    #[tokio::test]
    async fn test_frame_is_a_copy_until_refresh() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "forecast.csv", "timestamp,pred_no2\n2024-01-01,3\n");
        let specs = SourceSpecs::defaults(tmp.path()).only(&[DataSource::Forecast]);
        let mut loader = SourceLoader::load(specs).await.unwrap();

        write(
            tmp.path(),
            "forecast.csv",
            "timestamp,pred_no2\n2024-01-01,3\n2024-01-02,4\n",
        );
        assert_eq!(loader.frame(DataSource::Forecast).unwrap().height(), 1);
        loader.refresh().await.unwrap();
        assert_eq!(loader.frame(DataSource::Forecast).unwrap().height(), 2);
        assert!(matches!(
            loader.frame(DataSource::Weather),
            Err(SourceError::NotLoaded(DataSource::Weather))
        ));
    }
}
