use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::keys::CacheKey;
use super::store::CacheStore;

const SOURCE: &str = "menuhub::cache";

/// Typed, best-effort front for a [`CacheStore`].
///
/// Values are JSON snapshots. A malformed payload or an unreachable backend
/// reads as a miss, and failed writes or deletes are logged and dropped; the
/// caller never sees a cache error.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CacheClient {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let name = key.to_string();
        let raw = match self.store.get(&name).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                counter!("menuhub_cache_miss_total", "key" => key.kind()).increment(1);
                return None;
            }
            Err(err) => {
                counter!("menuhub_cache_error_total", "op" => "get").increment(1);
                warn!(target: SOURCE, key = %name, error = %err, "cache read failed; treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!("menuhub_cache_hit_total", "key" => key.kind()).increment(1);
                debug!(target: SOURCE, key = %name, "cache hit");
                Some(value)
            }
            Err(err) => {
                counter!("menuhub_cache_error_total", "op" => "decode").increment(1);
                warn!(target: SOURCE, key = %name, error = %err, "discarding malformed cache entry");
                None
            }
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) {
        let name = key.to_string();
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                counter!("menuhub_cache_error_total", "op" => "encode").increment(1);
                warn!(target: SOURCE, key = %name, error = %err, "failed to encode cache entry");
                return;
            }
        };

        if let Err(err) = self.store.set(&name, raw, self.ttl).await {
            counter!("menuhub_cache_error_total", "op" => "set").increment(1);
            warn!(target: SOURCE, key = %name, error = %err, "cache write failed");
        }
    }

    /// Drop every key in one batched call.
    pub async fn delete_many(&self, keys: &[CacheKey]) {
        if keys.is_empty() {
            return;
        }
        let names: Vec<String> = keys.iter().map(CacheKey::to_string).collect();
        match self.store.delete_many(&names).await {
            Ok(()) => debug!(target: SOURCE, keys = ?names, "cache keys invalidated"),
            Err(err) => {
                counter!("menuhub_cache_error_total", "op" => "delete").increment(1);
                warn!(target: SOURCE, keys = ?names, error = %err, "cache invalidation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::cache::config::CacheConfig;
    use crate::cache::store::{CacheError, MemoryCacheStore};
    use crate::domain::entities::MenuId;

    struct UnavailableStore;

    #[async_trait]
    impl CacheStore for UnavailableStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete_many(&self, _keys: &[String]) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn unavailable_backend_degrades_to_miss() {
        let client = CacheClient::new(Arc::new(UnavailableStore), Duration::from_secs(300));
        let key = CacheKey::Menu(MenuId(1));

        client.set(&key, &vec![1, 2, 3]).await;
        client.delete_many(&[key]).await;
        let value: Option<Vec<i32>> = client.get(&key).await;

        assert!(value.is_none());
    }

    #[tokio::test]
    async fn malformed_payload_reads_as_miss() {
        let store = Arc::new(MemoryCacheStore::new(&CacheConfig::default()));
        store
            .set("menu_1", "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let client = CacheClient::new(store, Duration::from_secs(300));

        let value: Option<Vec<i32>> = client.get(&CacheKey::Menu(MenuId(1))).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn round_trips_json_snapshots() {
        let store = Arc::new(MemoryCacheStore::new(&CacheConfig::default()));
        let client = CacheClient::new(store.clone(), Duration::from_secs(300));

        client.set(&CacheKey::MenuList, &vec!["a", "b"]).await;
        assert!(store.contains("menus_list"));

        let value: Option<Vec<String>> = client.get(&CacheKey::MenuList).await;
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));

        client.delete_many(&[CacheKey::MenuList]).await;
        assert!(!store.contains("menus_list"));
    }
}
