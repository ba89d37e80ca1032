//! # BlockVFS Core
//!
//! Lets an embedded database engine use an object store bucket as if it
//! were a local random-access file.
//!
//! The engine expects byte-addressable files with small in-place writes. An
//! object store only replaces or reads whole objects. BlockVFS bridges the
//! two by cutting every logical file into fixed-size blocks, one object per
//! block, and translating each file operation into block requests.
//!
//! This crate provides:
//! - Block addressing ([`blocks`]) shared by reads and writes
//! - [`VirtualFile`]: read, write, truncate and size over block objects
//! - [`BlockVfs`]: existence, delete, open, and whole-file export/import
//! - The plugin contract ([`Vfs`], [`VfsFile`]) the engine drives
//!
//! ## Layout
//!
//! Block `n` of file `p` is the object `p/nnnnnnnnnn` (ten digits). All
//! blocks but the last hold exactly `block_size` bytes; the file size is the
//! sum of the block sizes.
//!
//! ## Concurrency
//!
//! Every call is synchronous and issues its block requests one after the
//! other. No locks are taken: the caller guarantees one writer per file.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod block;
mod config;
mod contract;
mod error;
mod file;
mod key;
mod stream;
mod vfs;

pub use block::{block_index, blocks, BlockRange, BlockSpan};
pub use config::{Config, DEFAULT_BLOCK_SIZE, DEFAULT_VFS_NAME};
pub use contract::{AccessFlags, LockLevel, OpenFlags, SyncFlags, Vfs, VfsFile};
pub use error::{VfsError, VfsResult};
pub use file::{VirtualFile, LOCK_REGION_OFFSET};
pub use key::{block_dir, block_key, parse_block_index, INDEX_WIDTH, MAX_BLOCK_INDEX};
pub use stream::{BlockReader, ChunkReader};
pub use vfs::BlockVfs;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
