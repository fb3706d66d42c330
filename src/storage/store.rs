//! Record store
//!
//! Owns the data directory and writes one file per ingested payload.

use chrono::{DateTime, Local};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::record::{file_stamp, record_file_name, StoredRecord};

/// Name candidates tried for one timestamp before giving up
const MAX_NAME_ATTEMPTS: u32 = 17;

/// Failure while preparing or writing the data directory
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no free file name for timestamp {stamp} after {attempts} attempts")]
    NamesExhausted { stamp: String, attempts: u32 },
}

/// Flat directory of stored records
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the data directory and its parents if missing
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// Number of entries directly inside the data directory
    pub fn count_files(&self) -> io::Result<usize> {
        Ok(std::fs::read_dir(&self.dir)?.count())
    }

    /// Persist a payload stamped with the current local time
    pub async fn save(&self, data: Value) -> Result<PathBuf, StoreError> {
        self.save_at(&Local::now(), data).await
    }

    /// Persist a payload stamped with `at`
    ///
    /// Never overwrites: an existing name moves on to the next suffixed
    /// candidate. A file left half-written by a failed write is removed.
    pub async fn save_at(&self, at: &DateTime<Local>, data: Value) -> Result<PathBuf, StoreError> {
        let record = StoredRecord::new(at, data);
        let bytes = record.to_pretty_json()?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(record_file_name(at, attempt));
            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(StoreError::Write { path, source }),
            };

            let written = match file.write_all(&bytes).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(source) = written {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(StoreError::Write { path, source });
            }
            return Ok(path);
        }

        Err(StoreError::NamesExhausted {
            stamp: file_stamp(at),
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn read_record(path: &Path) -> StoredRecord {
        let text = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let payload = json!({"ip": "10.0.0.1", "screen": [1920, 1080], "nested": {"ok": true}});

        let path = store.save(payload.clone()).await.unwrap();

        assert_eq!(path.parent().unwrap(), dir.path());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("data_") && name.ends_with(".json"), "{name}");
        // data_ + YYYYMMDD_HHMMSS_ffffff + .json
        assert_eq!(name.len(), "data_".len() + 22 + ".json".len());

        let record = read_record(&path);
        assert_eq!(record.data, payload);
        assert!(chrono::NaiveDateTime::parse_from_str(&record.received_at, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("a").join("b");
        let store = RecordStore::new(&data_dir);

        store.ensure_dir().unwrap();
        std::fs::write(data_dir.join("keep.json"), b"{}").unwrap();
        store.ensure_dir().unwrap();

        assert_eq!(store.count_files().unwrap(), 1);
        assert_eq!(std::fs::read(data_dir.join("keep.json")).unwrap(), b"{}");
    }

    #[test]
    fn test_ensure_dir_fails_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let store = RecordStore::new(blocker.join("data"));
        assert!(matches!(store.ensure_dir(), Err(StoreError::CreateDir { .. })));
    }

    #[tokio::test]
    async fn test_same_timestamp_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let at = Local::now();

        let first = store.save_at(&at, json!({"n": 1})).await.unwrap();
        let second = store.save_at(&at, json!({"n": 2})).await.unwrap();

        assert_ne!(first, second);
        assert!(second.to_str().unwrap().ends_with("-1.json"));
        assert_eq!(read_record(&first).data, json!({"n": 1}));
        assert_eq!(read_record(&second).data, json!({"n": 2}));
    }

    #[tokio::test]
    async fn test_names_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let at = Local::now();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            std::fs::write(dir.path().join(record_file_name(&at, attempt)), b"taken").unwrap();
        }

        let err = store.save_at(&at, json!(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NamesExhausted { .. }));
    }

    #[tokio::test]
    async fn test_missing_dir_fails_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = RecordStore::new(&data_dir);
        store.ensure_dir().unwrap();
        std::fs::remove_dir(&data_dir).unwrap();

        let err = store.save(json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(!data_dir.exists());
    }

    #[tokio::test]
    async fn test_concurrent_saves() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save(json!({"seq": i})).await })
            })
            .collect();

        let mut paths = HashSet::new();
        for handle in handles {
            paths.insert(handle.await.unwrap().unwrap());
        }
        assert_eq!(paths.len(), 64);
        assert_eq!(store.count_files().unwrap(), 64);

        let mut seqs: Vec<i64> = paths
            .iter()
            .map(|p| read_record(p).data["seq"].as_i64().unwrap())
            .collect();
        seqs.sort_unstable();
        assert_eq!(seqs, (0..64).collect::<Vec<_>>());
    }
}
