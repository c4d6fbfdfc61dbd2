pub mod disk;
pub mod memory;
pub mod rates_db;

pub use rates_db::RatesDb;

use crate::core::collection::KeyValueCollection;
use crate::core::error::StoreError;
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions, PersistMode};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::debug;

/// Hands out named collections, either in memory or in an on-disk keyspace.
pub struct KeyValueStore {
    collections: Mutex<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    /// Opens (or creates) the keyspace under `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let keyspace = fjall::Config::new(path.join("fxrates_db")).open()?;
        debug!("Opened keyspace at {}", path.display());

        Ok(Self {
            collections: Mutex::new(HashMap::new()),
            keyspace: Some(keyspace),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            keyspace: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.keyspace.is_some()
    }

    /// Returns the collection called `name`, creating it on first use.
    pub fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>, StoreError> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        let collection: Arc<dyn KeyValueCollection> = match &self.keyspace {
            Some(keyspace) => {
                let partition =
                    keyspace.open_partition(name, PartitionCreateOptions::default())?;
                Arc::new(DiskCollection::new(partition))
            }
            None => Arc::new(MemoryCollection::new()),
        };
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }

    /// Flushes the journal to disk. A no-op for in-memory stores.
    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(keyspace) = &self.keyspace {
            keyspace.persist(PersistMode::SyncAll)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_collection_is_shared_by_name() {
        let store = KeyValueStore::in_memory();
        assert!(!store.is_persistent());

        let first = store.collection("banks").unwrap();
        first.put(b"k", b"v").await.unwrap();

        let second = store.collection("banks").unwrap();
        assert_eq!(second.get(b"k").await.unwrap(), Some(b"v".to_vec()));

        let other = store.collection("records").unwrap();
        assert!(other.get(b"k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = KeyValueStore::open(dir.path()).unwrap();
            assert!(store.is_persistent());
            let collection = store.collection("banks").unwrap();
            collection.put(b"k", b"v").await.unwrap();
            store.persist().unwrap();
        }

        let store = KeyValueStore::open(dir.path()).unwrap();
        let collection = store.collection("banks").unwrap();
        assert_eq!(collection.get(b"k").await.unwrap(), Some(b"v".to_vec()));
    }
}
