//! Key-value storage capability.
//!
//! The pipeline persists detection events and settings through this
//! narrow interface only; it never depends on a concrete storage
//! format. [`MemoryStore`] is the in-process implementation used by
//! tests and by contexts without durable storage.

use crate::error::{Result, SentinelError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Asynchronous key-value storage capability.
///
/// Values are stored as strings (callers serialize with serde_json).
/// Implementations must tolerate concurrent calls; failures map to
/// [`SentinelError::Storage`], which every pipeline caller treats as a
/// logged no-op rather than a fatal condition.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the value for a key, if present.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace the value for a key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List all `(key, value)` pairs whose key starts with `prefix`,
    /// in key order.
    async fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>>;
}

/// In-memory [`Store`] backed by a mutexed ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| SentinelError::Storage("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .lock()?
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("a", "1").await.expect("set");
        assert_eq!(store.get("a").await.expect("get"), Some("1".to_string()));
        assert_eq!(store.get("missing").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("a", "1").await.expect("set");
        store.delete("a").await.expect("delete");
        store.delete("a").await.expect("delete again");
        assert_eq!(store.get("a").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_scan_prefix_order() {
        let store = MemoryStore::new();
        store.set("event:002", "b").await.expect("set");
        store.set("event:001", "a").await.expect("set");
        store.set("other:001", "x").await.expect("set");

        let events = store.scan("event:").await.expect("scan");
        assert_eq!(
            events,
            vec![
                ("event:001".to_string(), "a".to_string()),
                ("event:002".to_string(), "b".to_string()),
            ]
        );
    }
}
