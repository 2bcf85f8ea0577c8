//! Key-value storage abstraction and the expiring cache built on it

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::debug;

/// Entries older than this are dropped on read.
pub const CACHE_TTL: Duration = Duration::seconds(1800);

/// Key holding the list of known currency codes.
pub const CURRENCIES_KEY: &str = "currencies";

/// Key holding the rate table for `base`.
pub fn rates_key(base: &str) -> String {
    format!("rates_{base}")
}

/// Raw string storage behind the cache.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: String);
    async fn remove(&self, key: &str);
    async fn clear(&self);
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    /// Epoch milliseconds at write time
    timestamp: i64,
    data: T,
}

/// A cached value together with the time it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

/// Wraps a [`KeyValueCollection`] with a write timestamp and a fixed TTL.
#[derive(Clone)]
pub struct ExpiringCache {
    collection: Arc<dyn KeyValueCollection>,
    clock: Clock,
}

impl ExpiringCache {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self::with_clock(collection, Arc::new(Utc::now))
    }

    pub fn with_clock(collection: Arc<dyn KeyValueCollection>, clock: Clock) -> Self {
        Self { collection, clock }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_entry(key).await.map(|entry| entry.data)
    }

    /// Reads `key`, evicting it if it has outlived [`CACHE_TTL`].
    pub async fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Option<Cached<T>> {
        let raw = self.collection.get(key).await?;
        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Discarding unreadable cache entry for key {}: {}", key, e);
                return None;
            }
        };

        let now = (self.clock)();
        let age = now.timestamp_millis() - entry.timestamp;
        if age > CACHE_TTL.num_milliseconds() {
            debug!("Cache entry expired for key: {} (age {}ms)", key, age);
            self.collection.remove(key).await;
            return None;
        }

        debug!("Cache HIT for key: {}", key);
        let cached_at = Utc
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .unwrap_or(now);
        Some(Cached {
            data: entry.data,
            cached_at,
        })
    }

    pub async fn set<T: Serialize>(&self, key: &str, data: &T) {
        let entry = CacheEntry {
            timestamp: (self.clock)().timestamp_millis(),
            data,
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => {
                self.collection.put(key, raw).await;
                debug!("Cache PUT for key: {}", key);
            }
            Err(e) => debug!("Could not serialize cache entry for key {}: {}", key, e),
        }
    }

    pub async fn delete(&self, key: &str) {
        self.collection.remove(key).await;
    }

    pub async fn clear(&self) {
        self.collection.clear().await;
    }
}
