//! Shared helpers for the BlockVFS benchmarks.

use blockvfs_core::{BlockVfs, Config};
use blockvfs_store::ObjectStore;
use std::sync::Arc;

/// Deterministic benchmark payload of `size` bytes.
pub fn bench_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Creates a filesystem over `store` with the given block size.
pub fn bench_vfs(store: Arc<dyn ObjectStore>, block_size: usize) -> BlockVfs {
    BlockVfs::new(store, Config::new().block_size(block_size)).expect("valid bench config")
}
