use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// Collection persisted in a fjall partition
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn persist(&self) {
        if let Err(e) = self.keyspace.persist(PersistMode::Buffer) {
            debug!("DiskCollection persist error: {}", e);
        }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Option<String> {
        let res: Result<Option<String>> = (|| {
            match self.partition.get(key)? {
                Some(bytes) => Ok(Some(String::from_utf8(bytes.to_vec())?)),
                None => Ok(None),
            }
        })();

        match res {
            Ok(Some(value)) => {
                debug!("Store HIT for key: {}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Store MISS for key: {}", key);
                None
            }
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: String) {
        match self.partition.insert(key, value.as_bytes()) {
            Ok(()) => debug!("Store PUT for key: {}", key),
            Err(e) => debug!("DiskCollection put error: {}", e),
        }
        self.persist();
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskCollection remove error: {}", e);
        }
        self.persist();
    }

    async fn clear(&self) {
        let keys: Vec<_> = self.partition.keys().filter_map(|k| k.ok()).collect();
        for key in keys {
            if let Err(e) = self.partition.remove(key) {
                debug!("DiskCollection clear error: {}", e);
            }
        }
        self.persist();
        debug!("Store CLEAR");
    }
}
