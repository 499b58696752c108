mod api;
mod config;
mod dashboard;
mod error;
mod ingest;
mod pipeline;
mod sources;
mod store;
mod types;
mod utils;

pub use error::AircastError;

pub use api::handlers::health::HealthResponse;
pub use api::handlers::predictions::{PredictionsQuery, PredictionsResponse};
pub use api::handlers::upload::{UploadJsonRequest, UploadResponse};
pub use api::{bind, create_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, ServerConfig};

pub use dashboard::{Dashboard, DashboardError, DashboardState};

pub use ingest::error::IngestError;
pub use ingest::raw_table::RawTable;
pub use ingest::validator::{validate, ValidatedTable};
pub use ingest::{validate_csv, validate_json};

pub use pipeline::{
    melt, series_points, snapshot, ColorClass, LongPoint, ResampleExt, SnapshotColumns,
    StationPoint, TIMESTAMP_COLUMN,
};

pub use sources::error::SourceError;
pub use sources::{DataSource, SourceLoader, SourceSpec, SourceSpecs};

pub use store::error::StoreError;
pub use store::prediction_store::{PredictionSnapshot, PredictionStore, StoreMetadata};

pub use types::granularity::Granularity;
pub use types::pollutant::Pollutant;
pub use types::prediction::{PredictionRecord, REQUIRED_COLUMNS};
pub use types::scope::FilterScope;
pub use types::weather_variable::WeatherVariable;

pub use utils::{default_data_dir, parse_timestamp, LAST_UPDATE_FORMAT, TIMESTAMP_FORMAT};
