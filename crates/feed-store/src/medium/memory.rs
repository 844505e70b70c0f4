//! Process-local medium.

use super::traits::KeyValueMedium;
use crate::error::{FeedStoreError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory medium backed by a `HashMap`.
///
/// Values live only as long as the medium. Clone an `Arc<InMemoryMedium>`
/// to let a test inspect or tamper with what the store wrote.
#[derive(Debug, Default)]
pub struct InMemoryMedium {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|e| FeedStoreError::poisoned("Failed to lock memory medium", e))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueMedium for InMemoryMedium {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| FeedStoreError::poisoned("Failed to lock memory medium", e))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| FeedStoreError::poisoned("Failed to lock memory medium", e))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| FeedStoreError::poisoned("Failed to lock memory medium", e))?;
        Ok(entries.remove(key).is_some())
    }
}
