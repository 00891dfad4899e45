mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use common::{InMemoryCatalog, RecordingStore, cache_client, catalog_services};
use menuhub::cache::{CacheClient, CacheError, CacheKey, CacheStore};
use menuhub::domain::entities::NewMenu;

struct DownStore;

#[async_trait]
impl CacheStore for DownStore {
    async fn get(&self, _: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection reset".to_string()))
    }

    async fn set(&self, _: &str, _: String, _: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection reset".to_string()))
    }

    async fn delete_many(&self, _: &[String]) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection reset".to_string()))
    }
}

#[tokio::test]
async fn cache_paths_emit_expected_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let repo = InMemoryCatalog::new();
    let (menus, _, _) = catalog_services(&repo, &cache_client(RecordingStore::new()));
    menus
        .create(
            (),
            NewMenu {
                title: "Lunch".to_string(),
                description: "Noon".to_string(),
            },
        )
        .await
        .expect("create menu");

    menus.list(()).await.expect("first list");
    menus.list(()).await.expect("second list");

    let down = CacheClient::new(Arc::new(DownStore), Duration::from_secs(1));
    assert_eq!(down.get::<Vec<String>>(&CacheKey::MenuList).await, None);
    down.set(&CacheKey::MenuList, &["stale"]).await;
    down.delete_many(&[CacheKey::MenuList]).await;

    let counters: HashMap<(String, Vec<String>), u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| {
            let DebugValue::Counter(count) = value else {
                return None;
            };
            let key = composite_key.key();
            let labels = key
                .labels()
                .map(|label| format!("{}={}", label.key(), label.value()))
                .collect();
            Some(((key.name().to_string(), labels), count))
        })
        .collect();

    let count = |name: &str, label: &str| {
        counters
            .get(&(name.to_string(), vec![label.to_string()]))
            .copied()
            .unwrap_or_default()
    };

    assert_eq!(count("menuhub_cache_miss_total", "key=menus_list"), 1);
    assert_eq!(count("menuhub_cache_hit_total", "key=menus_list"), 1);
    assert_eq!(count("menuhub_cache_error_total", "op=get"), 1);
    assert_eq!(count("menuhub_cache_error_total", "op=set"), 1);
    assert_eq!(count("menuhub_cache_error_total", "op=delete"), 1);
}
