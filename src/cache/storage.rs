//! Durable key-value storage backing the cache snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::Result;

/// Snapshot of every cache entry.
pub const CACHE_DATA_KEY: &str = "cache_data";
/// Persisted cache settings.
pub const CACHE_SETTINGS_KEY: &str = "cache_settings";
/// Persisted cache metrics (best effort).
pub const CACHE_METRICS_KEY: &str = "cache_metrics";

/// Sequence for temp file names; each write gets its own file.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// String key-value store with async access, the shape of device-local
/// storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    async fn remove_item(&self, key: &str) -> Result<()>;
}

// == File Storage ==
/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{}.{seq}.tmp", std::process::id()));

        // Write then rename so readers never see a half-written snapshot
        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(value.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, &path).await
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// == Memory Storage ==
/// Volatile storage for tests and cache-dir-less runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("cache")).await.unwrap();

        assert_eq!(storage.get_item(CACHE_DATA_KEY).await.unwrap(), None);

        storage.set_item(CACHE_DATA_KEY, r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            storage.get_item(CACHE_DATA_KEY).await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );

        storage.set_item(CACHE_DATA_KEY, "{}").await.unwrap();
        assert_eq!(
            storage.get_item(CACHE_DATA_KEY).await.unwrap().as_deref(),
            Some("{}")
        );
        assert!(storage.dir().join("cache_data.json").exists());
    }

    #[tokio::test]
    async fn test_file_storage_concurrent_writes_to_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();

        let values: Vec<String> = (0..16).map(|i| format!(r#"{{"maxSize":{i}}}"#)).collect();
        let results = futures::future::join_all(
            values
                .iter()
                .map(|value| storage.set_item(CACHE_SETTINGS_KEY, value)),
        )
        .await;
        assert!(results.iter().all(|r| r.is_ok()));

        let stored = storage.get_item(CACHE_SETTINGS_KEY).await.unwrap().unwrap();
        assert!(values.contains(&stored));

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec!["cache_settings.json".to_string()]);
    }

    #[tokio::test]
    async fn test_file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();

        storage.remove_item("never_written").await.unwrap();
        storage.set_item(CACHE_METRICS_KEY, "{}").await.unwrap();
        storage.remove_item(CACHE_METRICS_KEY).await.unwrap();
        assert_eq!(storage.get_item(CACHE_METRICS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_storage_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();

        storage.set_item("../escape:key", "x").await.unwrap();
        assert!(dir.path().join("___escape_key.json").exists());
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();

        storage.set_item(CACHE_SETTINGS_KEY, "{}").await.unwrap();
        assert_eq!(
            storage.get_item(CACHE_SETTINGS_KEY).await.unwrap().as_deref(),
            Some("{}")
        );
        storage.remove_item(CACHE_SETTINGS_KEY).await.unwrap();
        assert_eq!(storage.get_item(CACHE_SETTINGS_KEY).await.unwrap(), None);
    }
}
