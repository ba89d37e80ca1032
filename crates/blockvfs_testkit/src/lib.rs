//! # BlockVFS Testkit
//!
//! Test utilities for BlockVFS.
//!
//! This crate provides:
//! - Fixtures for in-memory and directory-backed filesystems
//! - Instrumented stores that record or fail requests
//! - A byte-level shadow model of a file
//! - Property-based test generators using proptest
//! - Block layout test vectors
//! - Cross-crate integration test helpers
//!
//! ## Usage
//!
//! ```rust
//! use blockvfs_testkit::prelude::*;
//! use blockvfs_core::{OpenFlags, Vfs, VfsFile};
//!
//! with_temp_vfs(4096, |vfs| {
//!     let mut file = vfs.open("t.db", OpenFlags::READWRITE).unwrap();
//!     file.write(b"abc", 0).unwrap();
//!     assert_eq!(file.file_size().unwrap(), 3);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod model;
pub mod stores;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::model::*;
    pub use crate::stores::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use model::*;
pub use stores::*;
pub use vectors::*;
