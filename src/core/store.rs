//! Namespaced key/value cache over durable storage
//!
//! A [`Store`] loads one namespace from a [`DurableStorage`] backend when it is
//! opened, serves reads from memory, and writes the whole namespace snapshot
//! back after every mutation. A failed write is reported to the caller but the
//! in-memory mapping is kept, so it stays the source of truth for the rest of
//! the process lifetime.

use crate::core::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Namespace used by the project registry
pub const DEFAULT_NAMESPACE: &str = "cache";

/// A namespace snapshot as persisted by the backend
pub type Snapshot = Map<String, Value>;

/// Process-wide durable key/value storage provided by the host
#[async_trait]
pub trait DurableStorage: Send + Sync {
    /// Read the snapshot stored under `namespace`, if any
    async fn read(&self, namespace: &str) -> Result<Option<Snapshot>>;

    /// Replace the snapshot stored under `namespace`
    async fn write(&self, namespace: &str, snapshot: &Snapshot) -> Result<()>;
}

/// In-memory view of one storage namespace
#[derive(Debug)]
pub struct Store<S> {
    storage: S,
    namespace: String,
    cache: Snapshot,
}

impl<S: DurableStorage> Store<S> {
    /// Open `namespace`, loading its current snapshot into memory
    pub async fn open(storage: S, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let cache = storage.read(&namespace).await?.unwrap_or_default();
        tracing::debug!(namespace = %namespace, keys = cache.len(), "Loaded store");
        Ok(Self {
            storage,
            namespace,
            cache,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Read a raw value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.cache.get(key)
    }

    /// Read and deserialize a value
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Set one key and persist the namespace
    pub async fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.cache.insert(key.to_string(), value);
        self.flush().await
    }

    /// Set several keys in a single persist cycle
    pub async fn set_many<I, K>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in values {
            self.cache.insert(key.into(), value);
        }
        self.flush().await
    }

    /// Remove one key, or everything in the namespace when `key` is `None`
    pub async fn clear(&mut self, key: Option<&str>) -> Result<()> {
        match key {
            Some(key) => {
                self.cache.remove(key);
            }
            None => self.cache.clear(),
        }
        self.flush().await
    }

    async fn flush(&self) -> Result<()> {
        self.storage
            .write(&self.namespace, &self.cache)
            .await
            .map_err(|e| match e {
                Error::Persistence(_) => e,
                other => Error::persistence(other.to_string()),
            })
    }
}

/// JSON file holding one object per namespace
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Snapshot> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::persistence(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl DurableStorage for JsonFileStorage {
    async fn read(&self, namespace: &str) -> Result<Option<Snapshot>> {
        let mut all = self.read_all().await?;
        match all.remove(namespace) {
            Some(Value::Object(snapshot)) => Ok(Some(snapshot)),
            Some(_) => Err(Error::persistence(format!(
                "namespace '{}' is not an object",
                namespace
            ))),
            None => Ok(None),
        }
    }

    async fn write(&self, namespace: &str, snapshot: &Snapshot) -> Result<()> {
        // Other namespaces in the same file are left untouched; an unreadable
        // file is replaced rather than blocking every later write.
        let mut all = self.read_all().await.unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "Replacing unreadable state file: {}", e);
            Map::new()
        });
        all.insert(namespace.to_string(), Value::Object(snapshot.clone()));

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(all))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Storage kept entirely in memory
///
/// Clones share the same backing map. Writes can be made to fail, which lets
/// tests observe how callers treat a rejected flush.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    namespaces: Arc<Mutex<HashMap<String, Snapshot>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current durable snapshot of a namespace
    pub fn snapshot(&self, namespace: &str) -> Option<Snapshot> {
        self.namespaces.lock().get(namespace).cloned()
    }

    /// Seed a namespace directly, bypassing any `Store`
    pub fn insert(&self, namespace: &str, snapshot: Snapshot) {
        self.namespaces.lock().insert(namespace.to_string(), snapshot);
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn read(&self, namespace: &str) -> Result<Option<Snapshot>> {
        Ok(self.namespaces.lock().get(namespace).cloned())
    }

    async fn write(&self, namespace: &str, snapshot: &Snapshot) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::persistence("storage rejected the write"));
        }
        self.namespaces
            .lock()
            .insert(namespace.to_string(), snapshot.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_empty_namespace() {
        let store = Store::open(MemoryStorage::new(), "cache").await.unwrap();
        assert_eq!(store.namespace(), "cache");
        assert!(store.get("projects").is_none());
    }

    #[tokio::test]
    async fn test_set_persists_whole_namespace() {
        let storage = MemoryStorage::new();
        let mut store = Store::open(storage.clone(), "cache").await.unwrap();

        store.set("a", 1).await.unwrap();
        store.set("b", "two").await.unwrap();

        let snapshot = storage.snapshot("cache").unwrap();
        assert_eq!(snapshot.get("a"), Some(&json!(1)));
        assert_eq!(snapshot.get("b"), Some(&json!("two")));
        assert_eq!(storage.write_count(), 2);
    }

    #[tokio::test]
    async fn test_set_many_uses_one_flush() {
        let storage = MemoryStorage::new();
        let mut store = Store::open(storage.clone(), "cache").await.unwrap();

        store
            .set_many(vec![("a", json!(1)), ("b", json!(2)), ("c", json!(3))])
            .await
            .unwrap();

        assert_eq!(storage.write_count(), 1);
        assert_eq!(store.get_as::<u32>("c").unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_clear_one_key_and_everything() {
        let storage = MemoryStorage::new();
        let mut store = Store::open(storage.clone(), "cache").await.unwrap();
        store
            .set_many(vec![("a", json!(1)), ("b", json!(2))])
            .await
            .unwrap();

        store.clear(Some("a")).await.unwrap();
        assert!(!store.contains("a"));
        assert!(store.contains("b"));

        store.clear(None).await.unwrap();
        assert!(storage.snapshot("cache").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_state() {
        let storage = MemoryStorage::new();
        let mut store = Store::open(storage.clone(), "cache").await.unwrap();
        storage.set_fail_writes(true);

        let err = store.set("a", 1).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(store.get_as::<u32>("a").unwrap(), Some(1));
        assert!(storage.snapshot("cache").is_none());

        // The next successful write carries the earlier mutation too
        storage.set_fail_writes(false);
        store.set("b", 2).await.unwrap();
        let snapshot = storage.snapshot("cache").unwrap();
        assert_eq!(snapshot.get("a"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let storage = MemoryStorage::new();
        let mut first = Store::open(storage.clone(), "one").await.unwrap();
        let mut second = Store::open(storage.clone(), "two").await.unwrap();

        first.set("key", "first").await.unwrap();
        second.set("key", "second").await.unwrap();
        second.clear(None).await.unwrap();

        let reopened = Store::open(storage, "one").await.unwrap();
        assert_eq!(
            reopened.get_as::<String>("key").unwrap().as_deref(),
            Some("first")
        );
    }

    #[tokio::test]
    async fn test_json_file_storage_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("state.json");
        let storage = JsonFileStorage::new(&path);

        {
            let mut store = Store::open(storage.clone(), "cache").await.unwrap();
            store.set("projects", json!([{"name": "foo"}])).await.unwrap();
        }
        {
            let mut other = Store::open(storage.clone(), "other").await.unwrap();
            other.set("x", true).await.unwrap();
        }

        let store = Store::open(storage, "cache").await.unwrap();
        assert_eq!(store.get("projects"), Some(&json!([{"name": "foo"}])));
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_json_file_storage_rejects_non_object() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = Store::open(JsonFileStorage::new(&path), "cache")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[tokio::test]
    async fn test_json_file_storage_treats_empty_file_as_empty() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "  \n").unwrap();

        let store = Store::open(JsonFileStorage::new(&path), "cache")
            .await
            .unwrap();
        assert!(store.get("anything").is_none());
    }
}
