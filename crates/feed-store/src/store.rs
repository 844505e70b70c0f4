//! The single-slot feed cache.
//!
//! `MediumFeedStore` owns one key inside a [`KeyValueMedium`] and guards it
//! with a fair reader-writer lock:
//! - `insert` and `delete` take the write side, so mutations never overlap and
//!   apply in the order they queued for the lock.
//! - `retrieve` takes the read side, so it never observes a write in progress
//!   while concurrent retrieves still run in parallel.

use crate::codec;
use crate::config::{FeedStoreConfig, StoreConfig};
use crate::error::{DeletionError, InsertionError, Result, RetrievalError};
use crate::medium::{FileMedium, InMemoryMedium, KeyValueMedium, SqliteMedium};
use crate::models::{CacheState, FeedSnapshot};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache contract for a single feed snapshot.
///
/// Each call completes exactly once with either its value or a typed error.
/// Nothing is retried internally.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Read the cached snapshot.
    ///
    /// An empty slot yields `CacheState::Empty`. Reads never modify the slot.
    async fn retrieve(&self) -> std::result::Result<CacheState, RetrievalError>;

    /// Replace the cached snapshot.
    ///
    /// On failure the previously cached value is left as it was.
    async fn insert(&self, snapshot: FeedSnapshot) -> std::result::Result<(), InsertionError>;

    /// Clear the slot. Succeeds when the slot is already empty.
    async fn delete(&self) -> std::result::Result<(), DeletionError>;
}

/// Feed store over any key-value medium.
pub struct MediumFeedStore<M> {
    medium: M,
    key: String,
    /// Serializes mutations and keeps reads off in-flight writes.
    access: RwLock<()>,
}

impl<M: KeyValueMedium> MediumFeedStore<M> {
    /// Create a store owning `key` inside `medium`.
    pub fn new(medium: M, key: impl Into<String>) -> Self {
        Self {
            medium,
            key: key.into(),
            access: RwLock::new(()),
        }
    }

    /// Create a store from a validated configuration.
    pub fn with_config(medium: M, config: &FeedStoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(medium, config.key.clone()))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }
}

impl MediumFeedStore<InMemoryMedium> {
    /// Store backed by a fresh in-memory medium under the default key.
    pub fn in_memory() -> Self {
        Self::new(InMemoryMedium::new(), FeedStoreConfig::default().key)
    }
}

impl MediumFeedStore<FileMedium> {
    /// Store writing its blob to a file inside `dir`.
    pub fn open_file(dir: impl AsRef<Path>, config: &FeedStoreConfig) -> Result<Self> {
        config.validate()?;
        let medium = FileMedium::open(dir.as_ref().join(&config.namespace))?;
        Self::with_config(medium, config)
    }
}

impl MediumFeedStore<SqliteMedium> {
    /// Store keeping its blob in the SQLite database at `db_path`.
    pub fn open_sqlite(db_path: impl AsRef<Path>, config: &FeedStoreConfig) -> Result<Self> {
        config.validate()?;
        let medium = SqliteMedium::open_in_namespace(db_path, config.namespace.clone())?;
        Self::with_config(medium, config)
    }

    /// Store keeping its blob in `dir`, under the default database file name.
    pub fn open_sqlite_in_dir(dir: impl AsRef<Path>, config: &FeedStoreConfig) -> Result<Self> {
        Self::open_sqlite(dir.as_ref().join(StoreConfig::SQLITE_DB_FILENAME), config)
    }
}

#[async_trait]
impl<M: KeyValueMedium> FeedStore for MediumFeedStore<M> {
    async fn retrieve(&self) -> std::result::Result<CacheState, RetrievalError> {
        let _read = self.access.read().await;

        let Some(blob) = self.medium.get(&self.key).map_err(RetrievalError::Medium)? else {
            debug!("Cache slot '{}' is empty", self.key);
            return Ok(CacheState::Empty);
        };

        let snapshot = codec::decode(&blob).map_err(RetrievalError::Corrupted)?;
        debug!(
            "Retrieved {} images from cache slot '{}'",
            snapshot.images.len(),
            self.key
        );
        Ok(CacheState::Found(snapshot))
    }

    async fn insert(&self, snapshot: FeedSnapshot) -> std::result::Result<(), InsertionError> {
        let blob = codec::encode(&snapshot).map_err(InsertionError::Encoding)?;

        let _write = self.access.write().await;
        self.medium.set(&self.key, &blob).map_err(InsertionError::Medium)?;

        debug!(
            "Inserted {} images into cache slot '{}'",
            snapshot.images.len(),
            self.key
        );
        Ok(())
    }

    async fn delete(&self) -> std::result::Result<(), DeletionError> {
        let _write = self.access.write().await;

        let existed = self.medium.remove(&self.key).map_err(DeletionError::Medium)?;

        debug!("Deleted cache slot '{}' (existed: {})", self.key, existed);
        Ok(())
    }
}
