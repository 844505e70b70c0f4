//! Medium trait.

use crate::error::Result;
use std::sync::Arc;

/// Byte-level key-value storage.
///
/// All operations are synchronous and expected to complete quickly.
/// `set` must replace the value atomically: a concurrent or later `get`
/// sees either the old bytes or the new bytes, never a mix.
pub trait KeyValueMedium: Send + Sync {
    /// Get the bytes stored under `key`.
    ///
    /// Returns `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, overwriting any existing value.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value under `key`.
    ///
    /// Returns whether a value existed. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<bool>;
}

impl<M: KeyValueMedium + ?Sized> KeyValueMedium for Arc<M> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }
}

impl<M: KeyValueMedium + ?Sized> KeyValueMedium for Box<M> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }
}
