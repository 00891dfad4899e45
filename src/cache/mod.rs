//! Menuhub cache
//!
//! A read-through snapshot cache for catalog responses:
//!
//! - **Key scheme** (`keys`): hierarchy path → key name, mutation → stale keys
//! - **Client** (`client`): JSON encoding, fixed TTL, failures absorbed as misses
//! - **Stores**: Redis (`RedisCacheStore`) or in-process LRU (`MemoryCacheStore`)
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! redis_url = "redis://127.0.0.1:6379/0"
//! ttl_seconds = 300
//! memory_capacity = 1024
//! ```

mod client;
mod config;
mod keys;
mod lock;
mod redis_store;
mod store;

use std::sync::Arc;

use tracing::info;

pub use client::CacheClient;
pub use config::CacheConfig;
pub use keys::{CacheKey, Mutation};
pub use redis_store::RedisCacheStore;
pub use store::{CacheError, CacheStore, MemoryCacheStore};

/// Build the client for the configured backend.
pub async fn connect(config: &CacheConfig) -> Result<CacheClient, CacheError> {
    let store: Arc<dyn CacheStore> = match config.redis_url.as_deref() {
        Some(url) => {
            let store = RedisCacheStore::connect(url).await?;
            info!(target: "menuhub::cache", backend = "redis", "cache connected");
            Arc::new(store)
        }
        None => {
            info!(
                target: "menuhub::cache",
                backend = "memory",
                capacity = config.memory_capacity,
                "cache connected"
            );
            Arc::new(MemoryCacheStore::new(config))
        }
    };
    Ok(CacheClient::new(store, config.ttl))
}
