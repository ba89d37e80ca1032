//! Object store trait definition.

use crate::error::StoreResult;
use std::sync::Arc;

/// Key and size of a stored object, as reported by [`ObjectStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectMeta {
    /// Full object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
}

/// A bucket of whole objects addressed by string keys.
///
/// Object stores are **request/response** services. There is no partial
/// write, no append, and no batching: each method is one request that either
/// fully succeeds or fails.
///
/// # Invariants
///
/// - `get` returns `Ok(None)` for a key that was never written or was deleted
/// - `put` replaces the whole object; readers never see a mix of old and new
/// - `delete` and `delete_prefix` are idempotent
/// - `list` returns objects in ascending key order
///
/// # Implementors
///
/// - [`super::InMemoryObjectStore`] - For testing
/// - [`super::DirObjectStore`] - For a local directory acting as a bucket
pub trait ObjectStore: Send + Sync {
    /// Fetches the object stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason other than the
    /// object being absent.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Stores `data` under `key`, replacing any previous object.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the request fails.
    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Removes the object stored under `key`. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Removes every object whose key starts with `prefix`.
    ///
    /// Returns the number of objects removed.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or any removal fails. Objects removed
    /// before the failure stay removed.
    fn delete_prefix(&self, prefix: &str) -> StoreResult<u64>;

    /// Lists every object whose key starts with `prefix`, ascending by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        (**self).put(key, data)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        (**self).delete_prefix(prefix)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        (**self).list(prefix)
    }
}
