//! Centralized configuration for the feed store.
//!
//! Naming constants for the cache slot and the on-disk media, plus the
//! serializable `FeedStoreConfig` that callers hand to the store constructors.

use crate::error::{FeedStoreError, Result};
use serde::{Deserialize, Serialize};

/// Naming constants shared by the store and its media.
pub struct StoreConfig;

impl StoreConfig {
    /// Key of the single cache slot.
    pub const DEFAULT_KEY: &'static str = "feed";
    /// Namespace the slot lives in when the medium is shared.
    pub const DEFAULT_NAMESPACE: &'static str = "feed_store";
    /// Extension of blob files written by the file medium.
    pub const BLOB_EXTENSION: &'static str = "blob";
    /// Suffix for in-flight temp files written by the file medium.
    pub const TEMP_SUFFIX: &'static str = "tmp";
    /// Default file name of the SQLite database.
    pub const SQLITE_DB_FILENAME: &'static str = "feed-store.sqlite";
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FeedStoreConfig {
    /// Key of the cache slot inside the medium.
    pub key: String,
    /// Namespace used by media that share one backing store between owners.
    pub namespace: String,
}

impl Default for FeedStoreConfig {
    fn default() -> Self {
        Self {
            key: StoreConfig::DEFAULT_KEY.to_string(),
            namespace: StoreConfig::DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl FeedStoreConfig {
    /// Config with a custom slot key and the default namespace.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Reject keys and namespaces that cannot be stored safely.
    ///
    /// Keys double as file names for the file medium, so path separators
    /// and parent references are refused.
    pub fn validate(&self) -> Result<()> {
        validate_name("key", &self.key)?;
        validate_name("namespace", &self.namespace)
    }
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FeedStoreError::Config {
            message: format!("{} must not be empty", field),
        });
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(FeedStoreError::Config {
            message: format!("{} '{}' is not a valid slot name", field, value),
        });
    }
    Ok(())
}
