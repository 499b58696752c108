//! The CSV extracts behind the dashboard and where to find them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One of the files the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataSource {
    /// Latest readings per monitoring station, with coordinates.
    Stations,
    /// City-wide pollutant history for the trend charts.
    Trends,
    /// Gridded reanalysis weather variables.
    Weather,
    /// Model predictions per station.
    Forecast,
}

impl DataSource {
    pub const ALL: [DataSource; 4] = [
        DataSource::Stations,
        DataSource::Trends,
        DataSource::Weather,
        DataSource::Forecast,
    ];

    pub(crate) fn name(&self) -> &'static str {
        match self {
            DataSource::Stations => "stations",
            DataSource::Trends => "trends",
            DataSource::Weather => "weather",
            DataSource::Forecast => "forecast",
        }
    }

    /// Suffix used in `AIRCAST_<SOURCE>_PATH` style environment variables.
    pub(crate) fn env_name(&self) -> String {
        self.name().to_ascii_uppercase()
    }

    fn default_file_name(&self) -> &'static str {
        match self {
            DataSource::Stations => "stations.csv",
            DataSource::Trends => "forgraphs.csv",
            DataSource::Weather => "weather.csv",
            DataSource::Forecast => "forecast.csv",
        }
    }

    /// The default spec for this source, relative to `dir`.
    pub fn default_spec(&self, dir: &Path) -> SourceSpec {
        let spec = SourceSpec::new(dir.join(self.default_file_name()), "");
        match self {
            DataSource::Stations => SourceSpec {
                time_column: "to".into(),
                ..spec
            },
            DataSource::Trends => SourceSpec {
                time_column: "to date".into(),
                fallback_time_column: Some("to".into()),
                ..spec
            },
            DataSource::Weather => SourceSpec {
                time_column: "valid_time".into(),
                ..spec
            },
            DataSource::Forecast => SourceSpec {
                time_column: "timestamp".into(),
                ..spec
            },
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataSource::ALL
            .into_iter()
            .find(|source| source.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown data source '{s}'"))
    }
}

/// Where a source lives and which column holds its timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub time_column: String,
    /// Used when `time_column` is absent from the file. The loaded frame still
    /// exposes the timestamps under `time_column`.
    pub fallback_time_column: Option<String>,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>, time_column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            time_column: time_column.into(),
            fallback_time_column: None,
        }
    }

    pub(crate) fn time_column_candidates(&self) -> Vec<&str> {
        std::iter::once(self.time_column.as_str())
            .chain(self.fallback_time_column.as_deref())
            .collect()
    }
}

/// The set of sources to load, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSpecs(BTreeMap<DataSource, SourceSpec>);

impl SourceSpecs {
    /// Every source at its default file name inside `dir`.
    pub fn defaults(dir: &Path) -> Self {
        Self(
            DataSource::ALL
                .into_iter()
                .map(|source| (source, source.default_spec(dir)))
                .collect(),
        )
    }

    pub fn insert(&mut self, source: DataSource, spec: SourceSpec) {
        self.0.insert(source, spec);
    }

    pub fn get(&self, source: DataSource) -> Option<&SourceSpec> {
        self.0.get(&source)
    }

    pub fn get_mut(&mut self, source: DataSource) -> Option<&mut SourceSpec> {
        self.0.get_mut(&source)
    }

    /// Restricts the set to `sources`.
    pub fn only(mut self, sources: &[DataSource]) -> Self {
        self.0.retain(|source, _| sources.contains(source));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (DataSource, &SourceSpec)> {
        self.0.iter().map(|(source, spec)| (*source, spec))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
