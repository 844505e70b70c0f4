//! File-backed medium with atomic replacement.
//!
//! Each key maps to `{dir}/{key}.blob`. Writes go through a temp file:
//! 1. Write bytes to `{key}.blob.{pid}.{nonce}.tmp`
//! 2. fsync so the data reaches disk
//! 3. Rename over the target, which replaces it atomically
//!
//! A failed write removes its temp file and leaves the target untouched.

use super::traits::KeyValueMedium;
use crate::config::StoreConfig;
use crate::error::{FeedStoreError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn};
use uuid::Uuid;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Medium storing one file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    /// Open a medium rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| FeedStoreError::Io {
            message: format!("Failed to create store directory {}", dir.display()),
            path: Some(dir.clone()),
            source: Some(e),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the blob file for `key`.
    pub fn blob_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(FeedStoreError::Config {
                message: format!("'{}' cannot be used as a file key", key),
            });
        }
        Ok(self
            .dir
            .join(format!("{}.{}", key, StoreConfig::BLOB_EXTENSION)))
    }

    fn write_temp(temp_path: &Path, value: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .map_err(|e| FeedStoreError::Io {
                message: format!("Failed to create temp file {}", temp_path.display()),
                path: Some(temp_path.to_path_buf()),
                source: Some(e),
            })?;

        file.write_all(value).map_err(|e| FeedStoreError::Io {
            message: format!("Failed to write temp file {}", temp_path.display()),
            path: Some(temp_path.to_path_buf()),
            source: Some(e),
        })?;

        file.flush().map_err(|e| FeedStoreError::Io {
            message: format!("Failed to flush temp file {}", temp_path.display()),
            path: Some(temp_path.to_path_buf()),
            source: Some(e),
        })?;

        sync_file(&file).map_err(|e| FeedStoreError::Io {
            message: format!("Failed to sync temp file {}", temp_path.display()),
            path: Some(temp_path.to_path_buf()),
            source: Some(e),
        })
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn sync_file(file: &File) -> std::io::Result<()> {
    // SAFETY: the descriptor belongs to `file`, which is borrowed for the
    // duration of the call and therefore still open.
    let rc = unsafe { libc::fsync(file.as_raw_fd()) };
    if rc == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_file(file: &File) -> std::io::Result<()> {
    file.sync_all()
}

impl KeyValueMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FeedStoreError::io_with_path(e, path)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.blob_path(key)?;
        let temp_path = path.with_extension(format!(
            "{}.{}.{}.{}",
            StoreConfig::BLOB_EXTENSION,
            process::id(),
            Uuid::new_v4().simple(),
            StoreConfig::TEMP_SUFFIX
        ));

        let written = Self::write_temp(&temp_path, value).and_then(|()| {
            fs::rename(&temp_path, &path).map_err(|e| FeedStoreError::Io {
                message: format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    path.display()
                ),
                path: Some(path.clone()),
                source: Some(e),
            })
        });

        if written.is_err() {
            if let Err(e) = fs::remove_file(&temp_path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
                }
            }
            return written;
        }

        debug!("Atomically wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.blob_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FeedStoreError::io_with_path(e, path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_medium() -> (TempDir, FileMedium) {
        let temp_dir = TempDir::new().unwrap();
        let medium = FileMedium::open(temp_dir.path().join("store")).unwrap();
        (temp_dir, medium)
    }

    #[test]
    fn test_open_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("dir");
        FileMedium::open(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_write_and_read() {
        let (_temp, medium) = create_test_medium();

        medium.set("feed", b"hello world").unwrap();
        assert!(medium.blob_path("feed").unwrap().exists());
        assert_eq!(medium.get("feed").unwrap().unwrap(), b"hello world");
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let (_temp, medium) = create_test_medium();

        medium.set("feed", b"first").unwrap();
        medium.set("feed", b"second").unwrap();
        assert_eq!(medium.get("feed").unwrap().unwrap(), b"second");

        let files: Vec<_> = fs::read_dir(medium.dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["feed.blob".to_string()]);
    }

    #[test]
    fn test_read_and_remove_nonexistent() {
        let (_temp, medium) = create_test_medium();

        assert!(medium.get("feed").unwrap().is_none());
        assert!(!medium.remove("feed").unwrap());
    }

    #[test]
    fn test_remove_existing() {
        let (_temp, medium) = create_test_medium();

        medium.set("feed", b"data").unwrap();
        assert!(medium.remove("feed").unwrap());
        assert!(medium.get("feed").unwrap().is_none());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (_temp, medium) = create_test_medium();

        assert!(medium.set("../escape", b"data").is_err());
        assert!(medium.get("a/b").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_write_keeps_previous_value() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, medium) = create_test_medium();
        medium.set("feed", b"original").unwrap();

        // A read-only directory refuses the temp file.
        fs::set_permissions(medium.dir(), fs::Permissions::from_mode(0o555)).unwrap();
        let canary = medium.dir().join("canary");
        let writable = File::create(&canary).is_ok();
        let result = medium.set("feed", b"replacement");
        fs::set_permissions(medium.dir(), fs::Permissions::from_mode(0o755)).unwrap();

        if writable {
            // Running with privileges that ignore permissions; nothing to check.
            return;
        }
        assert!(result.is_err());
        assert_eq!(medium.get("feed").unwrap().unwrap(), b"original");
    }
}
