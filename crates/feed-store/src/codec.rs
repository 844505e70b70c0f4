//! JSON record codec for feed snapshots.
//!
//! A stored record looks like:
//!
//! ```json
//! {
//!   "id": "5f0c6b1e-...",
//!   "timestamp": "2024-05-01T12:30:00.123456789Z",
//!   "feed": [
//!     { "id": "...", "imageDescription": null, "location": "Oslo", "url": "https://..." }
//!   ]
//! }
//! ```
//!
//! The top-level `id` is a fresh identifier minted on every write. It is not
//! part of the snapshot and is optional when reading.

use crate::error::{DecodingError, EncodingError};
use crate::models::{FeedImage, FeedSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

#[derive(Serialize)]
struct StoredImageRef<'a> {
    id: Uuid,
    #[serde(rename = "imageDescription")]
    image_description: Option<&'a str>,
    location: Option<&'a str>,
    url: &'a Url,
}

#[derive(Serialize)]
struct StoredFeedRef<'a> {
    id: Uuid,
    timestamp: &'a DateTime<Utc>,
    feed: Vec<StoredImageRef<'a>>,
}

#[derive(Deserialize)]
struct StoredImage {
    id: Uuid,
    #[serde(rename = "imageDescription", default)]
    image_description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    url: Url,
}

#[derive(Deserialize)]
struct StoredFeed {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<Uuid>,
    timestamp: DateTime<Utc>,
    feed: Vec<StoredImage>,
}

/// Serialize a snapshot into a blob.
pub fn encode(snapshot: &FeedSnapshot) -> Result<Vec<u8>, EncodingError> {
    let feed = snapshot
        .images
        .iter()
        .map(|image| {
            if image.url.cannot_be_a_base() {
                return Err(EncodingError::InvalidUrl {
                    id: image.id,
                    url: image.url.to_string(),
                });
            }
            Ok(StoredImageRef {
                id: image.id,
                image_description: image.description.as_deref(),
                location: image.location.as_deref(),
                url: &image.url,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let record = StoredFeedRef {
        id: Uuid::new_v4(),
        timestamp: &snapshot.timestamp,
        feed,
    };

    Ok(serde_json::to_vec(&record)?)
}

/// Parse a blob produced by [`encode`].
///
/// Nothing is returned unless the whole record is valid.
pub fn decode(blob: &[u8]) -> Result<FeedSnapshot, DecodingError> {
    let record: StoredFeed = serde_json::from_slice(blob)?;

    let images = record
        .feed
        .into_iter()
        .map(|stored| {
            if stored.url.cannot_be_a_base() {
                return Err(DecodingError::InvalidUrl {
                    id: stored.id,
                    url: stored.url.into(),
                });
            }
            Ok(FeedImage {
                id: stored.id,
                description: stored.image_description,
                location: stored.location,
                url: stored.url,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedSnapshot {
        images,
        timestamp: record.timestamp,
    })
}
