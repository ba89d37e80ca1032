//! Error types for object store operations.

use std::io;
use thiserror::Error;

/// Result type for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to an object store.
///
/// A missing object is not an error; see [`crate::ObjectStore::get`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred in a local backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The key cannot be mapped onto the backend's namespace.
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),

    /// The remote store rejected or failed the request (network,
    /// permission, throttling).
    #[error("object store unavailable: {0}")]
    Unavailable(String),
}
