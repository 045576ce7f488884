//! JSON-file storage backend.
//!
//! All keys live in one JSON object on disk. Every write rewrites the whole
//! file through a sibling temp file and a rename, so a crash mid-write leaves
//! either the old or the new contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{KeyValueStore, StorageError};

type Entries = BTreeMap<String, String>;

/// A [`KeyValueStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. The file and its parent directory are created
    /// on the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Entries, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load entries for a write. An unreadable file is moved aside to
    /// `<name>.corrupt` and the write starts from an empty map.
    async fn load_for_write(&self) -> Result<Entries, StorageError> {
        match self.load().await {
            Err(StorageError::Encoding(e)) => {
                let backup = self.corrupt_path();
                warn!(
                    error = %e,
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "Storage file is corrupt, moving it aside"
                );
                tokio::fs::rename(&self.path, &backup).await?;
                Ok(Entries::new())
            }
            other => other,
        }
    }

    /// Where an unreadable storage file is moved.
    #[must_use]
    pub fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    async fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = entries.len(), "Storage file written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_write().await?;
        entries.insert(key.to_string(), value);
        self.save(&entries).await
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_write().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("k").await.expect("get"), None);
        store.set("k", "[1,2]".to_string()).await.expect("set");
        store.set("other", "x".to_string()).await.expect("set");

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("k").await.expect("get").as_deref(), Some("[1,2]"));
        assert_eq!(reopened.get("other").await.expect("get").as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_file_store_remove_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("storage.json"));

        store.set("a", "1".to_string()).await.expect("set");
        store.set("b", "2".to_string()).await.expect("set");
        store.remove("a").await.expect("remove");
        assert_eq!(store.get("a").await.expect("get"), None);
        assert_eq!(store.get("b").await.expect("get").as_deref(), Some("2"));

        store.clear().await.expect("clear");
        store.clear().await.expect("clear twice");
        assert!(!store.path().exists());
        assert_eq!(store.get("b").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, b"not json").await.expect("write");

        let store = FileStore::new(&path);
        assert!(matches!(store.get("k").await, Err(StorageError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_file_store_writes_over_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, br#"{"k": "[]""#).await.expect("write");

        let store = FileStore::new(&path);
        store.set("k", "v".to_string()).await.expect("set recovers");
        assert_eq!(store.get("k").await.expect("get").as_deref(), Some("v"));

        let backup = tokio::fs::read(store.corrupt_path()).await.expect("backup kept");
        assert_eq!(backup, br#"{"k": "[]""#);
    }

    #[tokio::test]
    async fn test_file_store_remove_over_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, b"garbage").await.expect("write");

        let store = FileStore::new(&path);
        store.remove("k").await.expect("remove recovers");
        assert_eq!(store.get("k").await.expect("get"), None);
        assert!(store.corrupt_path().exists());
    }
}
