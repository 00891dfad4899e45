//! Raw key-value backends.
//!
//! A store only moves text; serialization and failure absorption live in
//! [`CacheClient`](super::CacheClient).

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use thiserror::Error;

use super::config::CacheConfig;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove all `keys` in one round trip. An empty slice is a no-op.
    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError>;
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-process store with LRU eviction and per-entry expiry.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, MemoryEntry>>,
}

impl MemoryCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.memory_capacity_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        mutex_lock(&self.entries, SOURCE, "contains").contains(key)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        mutex_lock(&self.entries, SOURCE, "set")
            .put(key.to_string(), MemoryEntry { value, expires_at });
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut entries = mutex_lock(&self.entries, SOURCE, "delete_many");
        for key in keys {
            entries.pop(key.as_str());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize) -> MemoryCacheStore {
        MemoryCacheStore::new(&CacheConfig {
            memory_capacity: capacity,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = store(4);
        store
            .set("menu_1", "{}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("menu_1").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let store = store(4);
        store
            .set("menu_1", "{}".to_string(), Duration::ZERO)
            .await
            .unwrap();
        assert!(store.get("menu_1").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_many_removes_only_named_keys() {
        let store = store(4);
        for key in ["a", "b", "c"] {
            store
                .set(key, key.to_string(), Duration::from_secs(60))
                .await
                .unwrap();
        }
        store
            .delete_many(&["a".to_string(), "c".to_string(), "missing".to_string()])
            .await
            .unwrap();
        store.delete_many(&[]).await.unwrap();

        assert!(!store.contains("a"));
        assert!(store.contains("b"));
        assert!(!store.contains("c"));
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let store = store(1);
        store
            .set("a", "1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("b", "2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(store.get("a").await.unwrap().is_none());
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }
}
