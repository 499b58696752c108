use crate::sources::data_source::DataSource;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {source_kind} data from '{path}'")]
    Read {
        source_kind: DataSource,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("{source_kind} data in '{path}' has no time column (looked for {candidates})")]
    MissingTimeColumn {
        source_kind: DataSource,
        path: PathBuf,
        candidates: String,
    },

    #[error("Failed coercing the time column of {0} data")]
    TimeCoercion(DataSource, #[source] PolarsError),

    #[error("{0} data was not loaded")]
    NotLoaded(DataSource),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
