//! SQLite-backed medium.

use super::traits::KeyValueMedium;
use crate::config::StoreConfig;
use crate::error::{FeedStoreError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite-based medium.
///
/// Keys are isolated by namespace so several owners can share one database
/// file. Thread-safe via an internal mutex on the connection. Every write is
/// a single statement, so SQLite's transaction guarantees make it atomic.
#[derive(Clone)]
pub struct SqliteMedium {
    /// Database connection (wrapped for thread safety).
    conn: Arc<Mutex<Connection>>,
    namespace: String,
}

impl SqliteMedium {
    /// Open the database at `db_path` using the default namespace.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_in_namespace(db_path, StoreConfig::DEFAULT_NAMESPACE)
    }

    /// Open the database at `db_path`, scoping every key to `namespace`.
    ///
    /// Creates the database and table if they don't exist.
    pub fn open_in_namespace(
        db_path: impl AsRef<Path>,
        namespace: impl Into<String>,
    ) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FeedStoreError::Io {
                message: format!("Failed to create store directory: {}", e),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| FeedStoreError::Database {
            message: format!("Failed to open store database: {}", e),
            source: Some(e),
        })?;

        // WAL lets readers proceed while a write is committing
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| FeedStoreError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn, namespace)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| FeedStoreError::Database {
            message: format!("Failed to open in-memory database: {}", e),
            source: Some(e),
        })?;
        Self::from_connection(conn, StoreConfig::DEFAULT_NAMESPACE)
    }

    fn from_connection(conn: Connection, namespace: impl Into<String>) -> Result<Self> {
        let medium = Self {
            conn: Arc::new(Mutex::new(conn)),
            namespace: namespace.into(),
        };
        medium.init_schema()?;
        Ok(medium)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FeedStoreError::poisoned("Failed to lock database", e))
    }

    /// When the value under `key` was last written.
    pub fn last_updated(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;

        let updated_at: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM store_entries WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| FeedStoreError::Database {
                message: format!("Failed to query store entry: {}", e),
                source: Some(e),
            })?;

        updated_at
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| FeedStoreError::Other(format!("Bad updated_at {}: {}", s, e)))
            })
            .transpose()
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS store_entries (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            );
            "#,
        )
        .map_err(|e| FeedStoreError::Database {
            message: format!("Failed to initialize store schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }
}

impl KeyValueMedium for SqliteMedium {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT value FROM store_entries WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| FeedStoreError::Database {
            message: format!("Failed to query store entry: {}", e),
            source: Some(e),
        })
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.lock()?;

        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT OR REPLACE INTO store_entries
            (namespace, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![self.namespace, key, value, now],
        )
        .map_err(|e| FeedStoreError::Database {
            message: format!("Failed to set store entry: {}", e),
            source: Some(e),
        })?;

        debug!("Stored {} bytes under '{}/{}'", value.len(), self.namespace, key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;

        let deleted = conn
            .execute(
                "DELETE FROM store_entries WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
            )
            .map_err(|e| FeedStoreError::Database {
                message: format!("Failed to remove store entry: {}", e),
                source: Some(e),
            })?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_medium() -> (TempDir, SqliteMedium) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_store.sqlite");
        let medium = SqliteMedium::open(&db_path).unwrap();
        (temp_dir, medium)
    }

    #[test]
    fn test_set_and_get() {
        let (_temp, medium) = create_test_medium();

        medium.set("feed", b"hello world").unwrap();

        let value = medium.get("feed").unwrap();
        assert_eq!(value.unwrap(), b"hello world");
    }

    #[test]
    fn test_overwrite() {
        let (_temp, medium) = create_test_medium();

        medium.set("feed", b"first").unwrap();
        medium.set("feed", b"second").unwrap();

        assert_eq!(medium.get("feed").unwrap().unwrap(), b"second");
    }

    #[test]
    fn test_remove() {
        let (_temp, medium) = create_test_medium();

        medium.set("feed", b"data").unwrap();
        assert!(medium.remove("feed").unwrap());
        assert!(!medium.remove("feed").unwrap());
        assert!(medium.get("feed").unwrap().is_none());
    }

    #[test]
    fn test_namespace_isolation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("shared.sqlite");

        let first = SqliteMedium::open_in_namespace(&db_path, "ns1").unwrap();
        let second = SqliteMedium::open_in_namespace(&db_path, "ns2").unwrap();

        first.set("feed", b"value1").unwrap();
        second.set("feed", b"value2").unwrap();

        assert_eq!(first.get("feed").unwrap().unwrap(), b"value1");
        assert_eq!(second.get("feed").unwrap().unwrap(), b"value2");

        first.remove("feed").unwrap();
        assert!(second.get("feed").unwrap().is_some());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("store.sqlite");

        SqliteMedium::open(&db_path).unwrap().set("feed", b"kept").unwrap();

        let reopened = SqliteMedium::open(&db_path).unwrap();
        assert_eq!(reopened.get("feed").unwrap().unwrap(), b"kept");
    }

    #[test]
    fn test_last_updated_tracks_writes() {
        let (_temp, medium) = create_test_medium();
        assert!(medium.last_updated("feed").unwrap().is_none());

        let before = Utc::now() - chrono::Duration::seconds(1);
        medium.set("feed", b"data").unwrap();
        let updated = medium.last_updated("feed").unwrap().unwrap();
        assert!(updated >= before);
        assert!(updated <= Utc::now());

        medium.remove("feed").unwrap();
        assert!(medium.last_updated("feed").unwrap().is_none());
    }

    #[test]
    fn test_poisoned_connection_reports_lock_error() {
        let medium = SqliteMedium::open_in_memory().unwrap();
        let conn = medium.conn.clone();
        let _ = std::thread::spawn(move || {
            let _guard = conn.lock().unwrap();
            panic!("poison the connection mutex");
        })
        .join();

        assert!(matches!(medium.get("feed"), Err(FeedStoreError::Lock { .. })));
    }

    #[test]
    fn test_in_memory_database() {
        let medium = SqliteMedium::open_in_memory().unwrap();
        assert!(medium.get("feed").unwrap().is_none());
        medium.set("feed", b"x").unwrap();
        assert_eq!(medium.namespace(), StoreConfig::DEFAULT_NAMESPACE);
    }
}
