//! # BlockVFS Store
//!
//! Object store contract and backends for BlockVFS.
//!
//! This crate is the lowest layer of BlockVFS. An object store is a flat
//! namespace of keys mapping to **whole objects**: an object can be read,
//! replaced, deleted, or listed, but never partially rewritten.
//!
//! ## Design Principles
//!
//! - Stores know nothing about blocks, files, or offsets
//! - Every call is a single synchronous request
//! - A missing object is `Ok(None)`, never an error
//! - Must be `Send + Sync` so one store can back many open files
//!
//! ## Available Backends
//!
//! - [`InMemoryObjectStore`] - For testing and ephemeral buckets
//! - [`DirObjectStore`] - A local directory acting as a bucket
//!
//! ## Example
//!
//! ```rust
//! use blockvfs_store::{InMemoryObjectStore, ObjectStore};
//!
//! let store = InMemoryObjectStore::new();
//! store.put("db/0000000000", b"hello").unwrap();
//! assert_eq!(store.get("db/0000000000").unwrap().as_deref(), Some(&b"hello"[..]));
//! assert_eq!(store.list("db/").unwrap()[0].size, 5);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dir;
mod error;
mod memory;
mod store;

pub use dir::DirObjectStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use store::{ObjectMeta, ObjectStore};
