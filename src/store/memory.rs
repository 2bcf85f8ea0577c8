use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection backed by a HashMap
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Option<String> {
        let collection = self.inner.lock().await;
        let value = collection.get(key).cloned();
        if value.is_some() {
            debug!("Store HIT for key: {}", key);
        } else {
            debug!("Store MISS for key: {}", key);
        }
        value
    }

    async fn put(&self, key: &str, value: String) {
        let mut collection = self.inner.lock().await;
        debug!("Store PUT for key: {}", key);
        collection.insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) {
        let mut collection = self.inner.lock().await;
        collection.remove(key);
        debug!("Store REMOVE for key: {}", key);
    }

    async fn clear(&self) {
        let mut collection = self.inner.lock().await;
        collection.clear();
        debug!("Store CLEAR");
    }
}
