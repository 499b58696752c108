//! The durable holder of the current prediction generation.
//!
//! The store keeps exactly one generation: a Parquet table plus a small JSON sidecar
//! recording when it was written. Every write replaces both files wholesale.

use crate::ingest::validator::ValidatedTable;
use crate::store::error::StoreError;
use crate::store::frame::{frame_to_records, records_to_frame};
use crate::types::prediction::PredictionRecord;
use crate::utils::{ensure_data_dir_exists, now_naive_utc, parse_timestamp, LAST_UPDATE_FORMAT};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tokio::task;

const TABLE_FILE_NAME: &str = "predictions.parquet";
const METADATA_FILE_NAME: &str = "metadata.json";

/// Contents of the sidecar metadata record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// ISO-8601 instant of the last successful write.
    pub last_update: Option<String>,
}

/// One consistent view of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSnapshot {
    pub last_update: Option<NaiveDateTime>,
    pub rows: Vec<PredictionRecord>,
}

impl PredictionSnapshot {
    /// Keeps only rows for `pollutant`, compared case-insensitively.
    pub fn filter_pollutant(mut self, pollutant: &str) -> Self {
        self.rows.retain(|row| row.matches_pollutant(pollutant));
        self
    }
}

/// Holds the latest prediction table on disk.
///
/// Writers take an exclusive lock and readers a shared one, so a reader always sees
/// the table and its metadata from the same generation. Each file is first written
/// to a temporary file in the data directory and then renamed over the old one.
///
/// The guards are owned by the blocking file tasks, so a caller that is cancelled
/// mid-write still holds the lock until both files have been replaced.
pub struct PredictionStore {
    data_dir: PathBuf,
    generation: Arc<RwLock<()>>,
}

impl PredictionStore {
    /// Opens the store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DataDirCreation`] if the directory cannot be created.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        ensure_data_dir_exists(&data_dir)
            .await
            .map_err(|e| StoreError::DataDirCreation(data_dir.clone(), e))?;
        Ok(Self {
            data_dir,
            generation: Arc::new(RwLock::new(())),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn table_path(&self) -> PathBuf {
        self.data_dir.join(TABLE_FILE_NAME)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(METADATA_FILE_NAME)
    }

    /// Replaces the stored generation with `table` and stamps the current instant.
    ///
    /// Returns the new last-update instant.
    pub async fn write(&self, table: ValidatedTable) -> Result<NaiveDateTime, StoreError> {
        let records = table.into_records();
        let row_count = records.len();
        let data_dir = self.data_dir.clone();
        let table_path = self.table_path();
        let metadata_path = self.metadata_path();

        let guard = Arc::clone(&self.generation).write_owned().await;
        let last_update = now_naive_utc();
        let metadata = StoreMetadata {
            last_update: Some(last_update.format(LAST_UPDATE_FORMAT).to_string()),
        };

        task::spawn_blocking(move || {
            let _guard = guard;
            let mut df = records_to_frame(&records)?;
            write_table(&mut df, &data_dir, &table_path)?;
            write_metadata(&metadata, &data_dir, &metadata_path)?;
            Ok::<(), StoreError>(())
        })
        .await??;

        info!(
            "Stored new prediction generation with {} rows at {}",
            row_count,
            self.table_path().display()
        );
        Ok(last_update)
    }

    /// Reads the current generation.
    ///
    /// A store that was never written is a valid empty state and yields
    /// `PredictionSnapshot { last_update: None, rows: [] }`.
    ///
    /// # Errors
    ///
    /// Only an existing but unreadable table or metadata file is an error.
    pub async fn read(&self) -> Result<PredictionSnapshot, StoreError> {
        let table_path = self.table_path();
        let metadata_path = self.metadata_path();

        let guard = Arc::clone(&self.generation).read_owned().await;
        task::spawn_blocking(move || {
            let _guard = guard;
            if !table_path.exists() {
                debug!("No prediction table at {}", table_path.display());
                return Ok(PredictionSnapshot::default());
            }
            let rows = read_table(&table_path)?;
            let last_update = read_metadata(&metadata_path)?
                .last_update
                .and_then(|raw| match parse_timestamp(&raw) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        warn!("Ignoring unparseable last_update {:?}: {}", raw, e);
                        None
                    }
                });
            Ok(PredictionSnapshot { last_update, rows })
        })
        .await?
    }
}

fn write_table(df: &mut DataFrame, dir: &Path, path: &Path) -> Result<(), StoreError> {
    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| StoreError::ParquetWriteIo(path.to_path_buf(), e))?;
    ParquetWriter::new(temp.as_file_mut())
        .with_compression(ParquetCompression::Snappy)
        .finish(df)
        .map_err(|e| StoreError::ParquetWritePolars(path.to_path_buf(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::ParquetWriteIo(path.to_path_buf(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::Persist(path.to_path_buf(), e))?;
    Ok(())
}

fn write_metadata(metadata: &StoreMetadata, dir: &Path, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_vec(metadata).map_err(|e| StoreError::MetadataEncode(path.to_path_buf(), e))?;
    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| StoreError::MetadataWrite(path.to_path_buf(), e))?;
    temp.write_all(&json)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| StoreError::MetadataWrite(path.to_path_buf(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::Persist(path.to_path_buf(), e))?;
    Ok(())
}

fn read_table(path: &Path) -> Result<Vec<PredictionRecord>, StoreError> {
    let file = std::fs::File::open(path).map_err(|e| StoreError::ParquetOpen(path.to_path_buf(), e))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| StoreError::ParquetRead(path.to_path_buf(), e))?;
    frame_to_records(&df)
}

fn read_metadata(path: &Path) -> Result<StoreMetadata, StoreError> {
    if !path.exists() {
        return Ok(StoreMetadata::default());
    }
    let bytes = std::fs::read(path).map_err(|e| StoreError::MetadataRead(path.to_path_buf(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::MetadataDecode(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::validate_json;
    use crate::types::prediction::tests::record;
    use chrono::TimeDelta;
    use std::time::Duration;

    fn table_of(records: Vec<PredictionRecord>) -> ValidatedTable {
        let rows = records
            .iter()
            .map(|r| serde_json::to_value(r).unwrap().as_object().unwrap().clone())
            .collect();
        validate_json(Some(rows)).unwrap()
    }

    #[tokio::test]
    async fn test_never_written_store_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PredictionStore::open(tmp.path().join("data")).await.unwrap();
        let snapshot = store.read().await.unwrap();
        assert_eq!(snapshot, PredictionSnapshot::default());
        assert!(store.data_dir().is_dir());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PredictionStore::open(tmp.path()).await.unwrap();
        let mut observed = record("DL002", "O3", 9);
        observed.observed = Some(18.25);
        let records = vec![record("DL001", "NO2", 8), observed, record("DL003", "NO2", 8)];

        let before = now_naive_utc();
        let written_at = store.write(table_of(records.clone())).await.unwrap();
        let snapshot = store.read().await.unwrap();

        assert_eq!(snapshot.rows, records);
        let last_update = snapshot.last_update.unwrap();
        assert!(last_update >= before - TimeDelta::seconds(1));
        assert!((last_update - written_at).num_milliseconds().abs() < 1);
        assert!(store.table_path().exists());
        assert!(store.metadata_path().exists());
    }

    #[tokio::test]
    async fn test_write_replaces_previous_generation() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PredictionStore::open(tmp.path()).await.unwrap();
        store
            .write(table_of(vec![record("OLD", "NO2", 1), record("OLD", "NO2", 2)]))
            .await
            .unwrap();
        store.write(table_of(vec![record("NEW", "O3", 3)])).await.unwrap();

        let snapshot = store.read().await.unwrap();
        assert_eq!(snapshot.rows, vec![record("NEW", "O3", 3)]);
    }

    #[tokio::test]
    async fn test_metadata_sidecar_is_iso_json() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PredictionStore::open(tmp.path()).await.unwrap();
        store.write(table_of(vec![record("A", "NO2", 1)])).await.unwrap();

        let raw = std::fs::read_to_string(store.metadata_path()).unwrap();
        let metadata: StoreMetadata = serde_json::from_str(&raw).unwrap();
        let stamp = metadata.last_update.unwrap();
        assert!(stamp.contains('T'));
        assert!(NaiveDateTime::parse_from_str(&stamp, LAST_UPDATE_FORMAT).is_ok());
    }

    #[test]
    fn test_filter_pollutant() {
        let snapshot = PredictionSnapshot {
            last_update: None,
            rows: vec![record("A", "NO2", 1), record("A", "O3", 1), record("B", "no2", 2)],
        };
        let filtered = snapshot.filter_pollutant("NO2");
        assert_eq!(filtered.rows.len(), 2);
        assert!(filtered.rows.iter().all(|r| r.matches_pollutant("no2")));
    }

    #[tokio::test]
    async fn test_readers_never_observe_a_mixed_generation() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(PredictionStore::open(tmp.path()).await.unwrap());

        let generation = |station: &str, size: u32| {
            table_of((0..size).map(|h| record(station, "NO2", h)).collect())
        };
        store.write(generation("G0", 2)).await.unwrap();

        let mut handles = Vec::new();
        for (i, size) in [3u32, 5, 7, 4].into_iter().enumerate() {
            let writer = Arc::clone(&store);
            let table = generation(&format!("G{}", i + 1), size);
            handles.push(tokio::spawn(async move {
                writer.write(table).await.unwrap();
            }));
            let reader = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let snapshot = reader.read().await.unwrap();
                let station = snapshot.rows[0].station_id.clone();
                assert!(snapshot.rows.iter().all(|r| r.station_id == station));
                let expected = match station.as_str() {
                    "G0" => 2,
                    "G1" => 3,
                    "G2" => 5,
                    "G3" => 7,
                    "G4" => 4,
                    other => panic!("unexpected generation {other}"),
                };
                assert_eq!(snapshot.rows.len(), expected);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_aborted_write_keeps_the_lock_until_files_are_replaced() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(PredictionStore::open(tmp.path()).await.unwrap());

        let large = table_of(
            (0..50_000u32)
                .map(|i| record(&format!("A{i}"), "NO2", i % 24))
                .collect(),
        );
        let writer = Arc::clone(&store);
        let aborted = tokio::spawn(async move { writer.write(large).await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        aborted.abort();
        let _ = aborted.await;

        let written_at = store.write(table_of(vec![record("B", "O3", 5)])).await.unwrap();
        let snapshot = store.read().await.unwrap();

        assert_eq!(snapshot.rows, vec![record("B", "O3", 5)]);
        let last_update = snapshot.last_update.unwrap();
        assert!((last_update - written_at).num_milliseconds().abs() < 1);
    }
}
