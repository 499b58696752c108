use crate::config::ConfigError;
use crate::dashboard::error::DashboardError;
use crate::ingest::error::IngestError;
use crate::sources::error::SourceError;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AircastError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind server to '{0}'")]
    Bind(String, #[source] std::io::Error),

    #[error("Server stopped unexpectedly")]
    Serve(#[source] std::io::Error),
}
