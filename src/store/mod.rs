pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, warn};

/// A key-value store that hands out named collections, either in memory or
/// backed by an on-disk keyspace.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens a store whose persistent collections live under `data_path`.
    pub fn open(data_path: &Path) -> Self {
        let cache_dir = data_path.join("cache");
        let keyspace = match fjall::Config::new(&cache_dir).open() {
            Ok(ks) => Some(Arc::new(ks)),
            Err(e) => {
                warn!(
                    "Could not open cache at {}: {}. Falling back to memory.",
                    cache_dir.display(),
                    e
                );
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    /// Creates a store without any on-disk keyspace.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    /// Returns the collection called `name`, creating it on first use.
    ///
    /// A persistent collection degrades to memory when the keyspace is not
    /// available or the partition cannot be opened.
    pub fn collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection> {
        if let Some(existing) = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(existing);
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| self.create_collection(name, persist));
        Arc::clone(collection)
    }

    fn create_collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection> {
        if persist {
            if let Some(ks) = &self.keyspace {
                match ks.open_partition(name, PartitionCreateOptions::default()) {
                    Ok(partition) => {
                        debug!("Opened persistent collection: {}", name);
                        return Arc::new(DiskCollection::new(Arc::clone(ks), partition));
                    }
                    Err(e) => warn!("Could not open partition {}: {}", name, e),
                }
            }
        }
        debug!("Opened memory collection: {}", name);
        Arc::new(MemoryCollection::new())
    }
}
