use crate::sources::error::SourceError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed preparing dashboard data: {0}")]
    Frame(#[from] PolarsError),
}
