//! Domain types exchanged with callers of the store.

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

/// One image in a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedImage {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

impl FeedImage {
    pub fn new(id: Uuid, description: Option<String>, location: Option<String>, url: Url) -> Self {
        Self {
            id,
            description,
            location,
            url,
        }
    }
}

/// A complete feed value: ordered images plus the time it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub images: Vec<FeedImage>,
    pub timestamp: DateTime<Utc>,
}

impl FeedSnapshot {
    pub fn new(images: Vec<FeedImage>, timestamp: DateTime<Utc>) -> Self {
        Self { images, timestamp }
    }

    /// Whether the snapshot carries no images. An empty snapshot is still a
    /// cached value, distinct from an empty cache.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Outcome of a successful retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Found(FeedSnapshot),
}

impl CacheState {
    pub fn is_empty(&self) -> bool {
        matches!(self, CacheState::Empty)
    }

    /// The cached snapshot, if any.
    pub fn into_snapshot(self) -> Option<FeedSnapshot> {
        match self {
            CacheState::Empty => None,
            CacheState::Found(snapshot) => Some(snapshot),
        }
    }
}

impl From<Option<FeedSnapshot>> for CacheState {
    fn from(value: Option<FeedSnapshot>) -> Self {
        value.map_or(CacheState::Empty, CacheState::Found)
    }
}
