use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    // Errors during parquet writing (inside blocking task)
    #[error("I/O error writing prediction table '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing prediction table '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to read prediction table '{0}'")]
    ParquetRead(PathBuf, #[source] PolarsError),

    #[error("I/O error opening prediction table '{0}'")]
    ParquetOpen(PathBuf, #[source] std::io::Error),

    #[error("Failed to write store metadata '{0}'")]
    MetadataWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to read store metadata '{0}'")]
    MetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode store metadata '{0}'")]
    MetadataDecode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to encode store metadata '{0}'")]
    MetadataEncode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to move new generation into place at '{0}'")]
    Persist(PathBuf, #[source] tempfile::PersistError),

    #[error("Failed converting prediction records: {0}")]
    Frame(#[from] PolarsError),

    #[error("Stored prediction table is corrupt: {message}")]
    Corrupt { message: String },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
