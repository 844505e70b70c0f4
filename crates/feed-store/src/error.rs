//! Error types for the feed store.
//!
//! `FeedStoreError` covers failures of the underlying key-value media. The
//! per-operation errors (`RetrievalError`, `InsertionError`, `DeletionError`)
//! are what callers of the cache store see, and the codec errors
//! (`EncodingError`, `DecodingError`) describe why a snapshot could not be
//! turned into a blob or back.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Error raised by a key-value medium.
#[derive(Debug, Error)]
pub enum FeedStoreError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Lock poisoned: {message}")]
    Lock { message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for medium operations.
pub type Result<T> = std::result::Result<T, FeedStoreError>;

impl From<std::io::Error> for FeedStoreError {
    fn from(err: std::io::Error) -> Self {
        FeedStoreError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for FeedStoreError {
    fn from(err: rusqlite::Error) -> Self {
        FeedStoreError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl FeedStoreError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        FeedStoreError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a lock error from a poisoned guard.
    pub(crate) fn poisoned<E: std::fmt::Display>(what: &str, err: E) -> Self {
        FeedStoreError::Lock {
            message: format!("{}: {}", what, err),
        }
    }
}

/// A snapshot could not be serialized.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Image {id} has an unusable url: {url}")]
    InvalidUrl { id: Uuid, url: String },

    #[error("Failed to serialize feed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored blob is not a valid feed record.
#[derive(Debug, Error)]
pub enum DecodingError {
    #[error("Failed to parse feed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored image {id} has an unusable url: {url}")]
    InvalidUrl { id: Uuid, url: String },
}

/// Failure delivered by `retrieve`.
///
/// An empty slot is never reported through this type.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Cached feed is corrupted: {0}")]
    Corrupted(#[source] DecodingError),

    #[error("Failed to read cached feed: {0}")]
    Medium(#[source] FeedStoreError),
}

/// Failure delivered by `insert`. The previously stored value is left intact.
#[derive(Debug, Error)]
pub enum InsertionError {
    #[error("Failed to encode feed: {0}")]
    Encoding(#[source] EncodingError),

    #[error("Failed to write cached feed: {0}")]
    Medium(#[source] FeedStoreError),
}

/// Failure delivered by `delete`. Never raised just because the slot was empty.
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("Failed to delete cached feed: {0}")]
    Medium(#[source] FeedStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeedStoreError::Config {
            message: "key must not be empty".into(),
        };
        assert_eq!(err.to_string(), "Configuration error: key must not be empty");
    }

    #[test]
    fn test_io_with_path_keeps_path() {
        let err = FeedStoreError::io_with_path(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            "/cache/feed.blob",
        );
        match err {
            FeedStoreError::Io { path, source, .. } => {
                assert_eq!(path, Some(PathBuf::from("/cache/feed.blob")));
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_operation_errors_expose_source() {
        use std::error::Error as _;

        let decode = serde_json::from_slice::<serde_json::Value>(b"{")
            .map_err(DecodingError::from)
            .unwrap_err();
        let err = RetrievalError::Corrupted(decode);
        assert!(err.to_string().starts_with("Cached feed is corrupted"));
        assert!(err.source().is_some());

        let err = DeletionError::Medium(FeedStoreError::Other("disk gone".into()));
        assert_eq!(err.to_string(), "Failed to delete cached feed: disk gone");
    }
}
