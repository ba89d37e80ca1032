//! In-memory object store for testing.

use crate::error::StoreResult;
use crate::store::{ObjectMeta, ObjectStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory bucket.
///
/// Objects live in a sorted map, so listings come back in key order for
/// free. Suitable for:
/// - Unit tests
/// - Integration tests
/// - Scratch databases that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use blockvfs_store::{InMemoryObjectStore, ObjectStore};
///
/// let store = InMemoryObjectStore::new();
/// store.put("a/1", b"x").unwrap();
/// store.put("a/2", b"yz").unwrap();
/// assert_eq!(store.object_count(), 2);
/// assert_eq!(store.delete_prefix("a/").unwrap(), 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with objects.
    #[must_use]
    pub fn with_objects<K, I>(objects: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<u8>)>,
    {
        Self {
            objects: RwLock::new(objects.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns every key in ascending order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    /// Removes every object.
    pub fn clear(&self) {
        self.objects.write().clear();
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.objects.read().get(key).cloned())
    }

    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.objects.write().insert(key.to_owned(), data.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.objects.write().remove(key);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut objects = self.objects.write();
        let doomed: Vec<String> = objects
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            objects.remove(key);
        }
        Ok(doomed.len() as u64)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        let objects = self.objects.read();
        Ok(objects
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, data)| ObjectMeta {
                key: key.clone(),
                size: data.len() as u64,
            })
            .collect())
    }
}
