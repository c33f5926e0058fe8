//! JSON-file implementation of the `KeyValueStore` trait.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use wheel_core::error::DomainError;
use wheel_core::store::KeyValueStore;

/// Failure while opening or writing the store file.
#[derive(Debug, Error)]
pub enum StoreFileError {
    /// Reading or writing the file failed.
    #[error("store file {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file exists but is not a JSON object of strings.
    #[error("store file {path} is not a JSON object of strings: {source}")]
    Malformed {
        /// The file involved.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

impl From<StoreFileError> for DomainError {
    fn from(err: StoreFileError) -> Self {
        Self::Infrastructure(err.to_string())
    }
}

/// Key-value store persisted as a single JSON object on disk.
///
/// The whole object is cached in memory and rewritten on every save. Writes
/// go to a sibling temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is treated as an empty store
    /// and is created on the first save.
    ///
    /// # Errors
    ///
    /// Returns `StoreFileError::Io` if the file exists but cannot be read, and
    /// `StoreFileError::Malformed` if its contents are not a JSON object of
    /// string values.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreFileError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StoreFileError::Malformed {
                    path: path.clone(),
                    source,
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "store file not found, starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreFileError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the file backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreFileError> {
        let body = serde_json::to_string_pretty(entries).map_err(|source| {
            StoreFileError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(source) = tokio::fs::write(&tmp, body).await {
            discard_tmp(&tmp).await;
            return Err(StoreFileError::Io { path: tmp, source });
        }
        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            discard_tmp(&tmp).await;
            return Err(StoreFileError::Io {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    /// Writes `batch` on top of the cached entries. The cache only changes
    /// once the file has been replaced.
    async fn commit(&self, batch: &[(&str, &str)]) -> Result<(), StoreFileError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        for (key, value) in batch {
            next.insert((*key).to_owned(), (*value).to_owned());
        }
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }
}

async fn discard_tmp(tmp: &Path) {
    match tokio::fs::remove_file(tmp).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(
                path = %tmp.display(),
                error = %err,
                "failed to remove temporary store file"
            );
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.commit(&[(key, value)]).await?;
        Ok(())
    }

    async fn save_all(&self, batch: &[(&str, String)]) -> Result<(), DomainError> {
        let batch: Vec<(&str, &str)> = batch
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        self.commit(&batch).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).await.unwrap();

        assert_eq!(store.load("pool").await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_saved_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store
            .save_all(&[
                ("pool", r#"[{"name":"A","weight":3,"originalWeight":3}]"#.to_owned()),
                ("noRepeatEnabled", "true".to_owned()),
            ])
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.load("noRepeatEnabled").await.unwrap().as_deref(),
            Some("true")
        );
        assert!(reopened.load("pool").await.unwrap().unwrap().contains("\"A\""));
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_entries_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("store.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        let result = store.save_all(&[("pool", "[1]".to_owned())]).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(store.load("pool").await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_rename_keeps_previous_value_and_removes_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.save("winners", r#"["A"]"#).await.unwrap();
        // A directory in place of the file makes the rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let result = store.save("winners", r#"["A","B"]"#).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(
            store.load("winners").await.unwrap().as_deref(),
            Some(r#"["A"]"#)
        );
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_open_malformed_file_returns_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = JsonFileStore::open(&path).await;

        match result {
            Err(StoreFileError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_store_file_error_converts_to_infrastructure() {
        let err = StoreFileError::Io {
            path: PathBuf::from("/nowhere/store.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        match DomainError::from(err) {
            DomainError::Infrastructure(msg) => assert!(msg.contains("/nowhere/store.json")),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }
}
