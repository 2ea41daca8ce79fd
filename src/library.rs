use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::StoreError;

/// A user-marked book of interest, independent of reading state. One record
/// per book id; the dedupe lives in [`Library`], not the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: String,
    pub book_id: u64,
}

impl FavoriteRecord {
    pub fn new(book_id: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            book_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Reading,
    Finished,
}

/// Reading-progress record for a tracked book. `progress` is ground truth;
/// `status` is recomputed from it on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub book_id: u64,
    pub created_at: DateTime<Utc>,
    pub progress: f64,
    pub status: TrackingStatus,
}

impl TrackingRecord {
    pub fn new(book_id: u64) -> Self {
        Self {
            book_id,
            created_at: Utc::now(),
            progress: 0.0,
            status: TrackingStatus::Reading,
        }
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 100.0);
        self.status = if self.progress >= 100.0 {
            TrackingStatus::Finished
        } else {
            TrackingStatus::Reading
        };
    }
}

/// Persisted favorite/tracking records. Mutations are serialized per call;
/// no concurrent writers are assumed for one record.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn insert_favorite(&self, record: &FavoriteRecord) -> Result<(), StoreError>;
    async fn delete_favorite(&self, record: &FavoriteRecord) -> Result<(), StoreError>;
    async fn favorites(&self) -> Result<Vec<FavoriteRecord>, StoreError>;

    async fn insert_tracking(&self, record: &TrackingRecord) -> Result<(), StoreError>;
    async fn put_tracking(&self, record: &TrackingRecord) -> Result<(), StoreError>;
    async fn tracking(&self) -> Result<Vec<TrackingRecord>, StoreError>;
    async fn tracking_for_book(&self, book_id: u64) -> Result<Option<TrackingRecord>, StoreError>;
}

/// Filesystem-backed store: one JSON document per record, written
/// atomically via a tmp file and rename.
#[derive(Debug, Clone)]
pub struct LocalFsLibraryStore {
    base_dir: PathBuf,
}

impl LocalFsLibraryStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn favorites_dir(&self) -> PathBuf {
        self.base_dir.join("favorites")
    }

    fn favorite_path(&self, record_id: &str) -> PathBuf {
        self.favorites_dir().join(format!("{record_id}.json"))
    }

    fn tracking_dir(&self) -> PathBuf {
        self.base_dir.join("tracking")
    }

    fn tracking_path(&self, book_id: u64) -> PathBuf {
        self.tracking_dir().join(format!("{book_id}.json"))
    }
}

#[async_trait]
impl LibraryStore for LocalFsLibraryStore {
    async fn insert_favorite(&self, record: &FavoriteRecord) -> Result<(), StoreError> {
        write_json_atomic(&self.favorite_path(&record.id), record).await
    }

    async fn delete_favorite(&self, record: &FavoriteRecord) -> Result<(), StoreError> {
        match fs::remove_file(self.favorite_path(&record.id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn favorites(&self) -> Result<Vec<FavoriteRecord>, StoreError> {
        let mut records: Vec<FavoriteRecord> = read_json_dir(&self.favorites_dir()).await?;
        records.sort_by_key(|record| record.book_id);
        Ok(records)
    }

    async fn insert_tracking(&self, record: &TrackingRecord) -> Result<(), StoreError> {
        write_json_atomic(&self.tracking_path(record.book_id), record).await
    }

    async fn put_tracking(&self, record: &TrackingRecord) -> Result<(), StoreError> {
        write_json_atomic(&self.tracking_path(record.book_id), record).await
    }

    async fn tracking(&self) -> Result<Vec<TrackingRecord>, StoreError> {
        let mut records: Vec<TrackingRecord> = read_json_dir(&self.tracking_dir()).await?;
        records.sort_by_key(|record| record.book_id);
        Ok(records)
    }

    async fn tracking_for_book(&self, book_id: u64) -> Result<Option<TrackingRecord>, StoreError> {
        let path = self.tracking_path(book_id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

async fn read_json_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut records = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let bytes = fs::read(&path).await?;
        records.push(serde_json::from_slice(&bytes)?);
    }
    Ok(records)
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let parent = path.parent().ok_or_else(|| {
        StoreError::Io(std::io::Error::other(format!(
            "record path has no parent: {}",
            path.display()
        )))
    })?;
    fs::create_dir_all(parent).await?;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp_path, &data).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// Policy layer over a [`LibraryStore`]: favorite dedupe (check-then-insert),
/// create-once tracking, clamped progress writes.
#[derive(Clone)]
pub struct Library {
    store: Arc<dyn LibraryStore>,
}

impl Library {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// Add a favorite unless one already exists for this book. Returns
    /// whether a record was created.
    pub async fn add_favorite(&self, book_id: u64) -> Result<bool, StoreError> {
        if self.favorite_for_book(book_id).await?.is_some() {
            tracing::debug!(book_id, "book is already a favorite");
            return Ok(false);
        }
        let record = FavoriteRecord::new(book_id);
        self.store.insert_favorite(&record).await?;
        Ok(true)
    }

    /// Remove the favorite for this book, if any. Returns whether a record
    /// was deleted.
    pub async fn remove_favorite(&self, book_id: u64) -> Result<bool, StoreError> {
        let Some(record) = self.favorite_for_book(book_id).await? else {
            return Ok(false);
        };
        self.store.delete_favorite(&record).await?;
        Ok(true)
    }

    pub async fn favorite_for_book(&self, book_id: u64) -> Result<Option<FavoriteRecord>, StoreError> {
        let favorites = self.store.favorites().await?;
        Ok(favorites.into_iter().find(|record| record.book_id == book_id))
    }

    pub async fn favorite_ids(&self) -> Result<Vec<u64>, StoreError> {
        let favorites = self.store.favorites().await?;
        Ok(favorites.into_iter().map(|record| record.book_id).collect())
    }

    /// Create a tracking record for this book if none exists, at progress
    /// zero. Idempotent: an existing record is returned unchanged.
    pub async fn start_tracking(&self, book_id: u64) -> Result<TrackingRecord, StoreError> {
        if let Some(existing) = self.store.tracking_for_book(book_id).await? {
            tracing::debug!(book_id, "book is already tracked");
            return Ok(existing);
        }
        let record = TrackingRecord::new(book_id);
        self.store.insert_tracking(&record).await?;
        Ok(record)
    }

    pub async fn tracking_for_book(&self, book_id: u64) -> Result<Option<TrackingRecord>, StoreError> {
        self.store.tracking_for_book(book_id).await
    }

    pub async fn tracking_ids(&self) -> Result<Vec<u64>, StoreError> {
        let records = self.store.tracking().await?;
        Ok(records.into_iter().map(|record| record.book_id).collect())
    }

    pub async fn tracking_records(&self) -> Result<Vec<TrackingRecord>, StoreError> {
        self.store.tracking().await
    }

    /// Write final progress for a tracked book, clamped to `[0, 100]`, and
    /// rederive its status. Returns the updated record, or `None` when the
    /// book has no tracking record (progress is only persisted for tracked
    /// books).
    pub async fn save_progress(
        &self,
        book_id: u64,
        progress: f64,
    ) -> Result<Option<TrackingRecord>, StoreError> {
        let Some(mut record) = self.store.tracking_for_book(book_id).await? else {
            return Ok(None);
        };
        record.set_progress(progress);
        self.store.put_tracking(&record).await?;
        Ok(Some(record))
    }
}
