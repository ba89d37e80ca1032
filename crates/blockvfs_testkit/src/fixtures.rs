//! Test fixtures and filesystem helpers.
//!
//! Provides convenience functions for setting up test filesystems over an
//! in-memory or a temporary-directory bucket.

use blockvfs_core::{BlockVfs, Config};
use blockvfs_store::{DirObjectStore, InMemoryObjectStore, ObjectStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test filesystem with automatic cleanup.
pub struct TestVfs {
    /// The filesystem instance.
    pub vfs: BlockVfs,
    /// The backing store.
    pub store: Arc<dyn ObjectStore>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestVfs {
    /// Creates a filesystem over a fresh in-memory bucket.
    pub fn memory(block_size: usize) -> Self {
        Self::over(Arc::new(InMemoryObjectStore::new()), block_size)
    }

    /// Creates a filesystem over a fresh temporary directory.
    pub fn dir(block_size: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = DirObjectStore::open(&temp_dir.path().join("bucket"))
            .expect("Failed to open directory store");
        let mut test_vfs = Self::over(Arc::new(store), block_size);
        test_vfs.temp_dir = Some(temp_dir);
        test_vfs
    }

    /// Creates a filesystem over an existing store.
    pub fn over(store: Arc<dyn ObjectStore>, block_size: usize) -> Self {
        let vfs = BlockVfs::new(Arc::clone(&store), Config::new().block_size(block_size))
            .expect("Failed to create filesystem");
        Self {
            vfs,
            store,
            temp_dir: None,
        }
    }

    /// Returns the bucket directory if directory-backed, None if in-memory.
    pub fn path(&self) -> Option<std::path::PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join("bucket"))
    }
}

impl std::ops::Deref for TestVfs {
    type Target = BlockVfs;

    fn deref(&self) -> &Self::Target {
        &self.vfs
    }
}

/// Runs a test with a temporary in-memory filesystem.
pub fn with_temp_vfs<F, R>(block_size: usize, f: F) -> R
where
    F: FnOnce(&BlockVfs) -> R,
{
    let test_vfs = TestVfs::memory(block_size);
    f(&test_vfs.vfs)
}

/// Runs a test with a temporary directory-backed filesystem.
pub fn with_dir_vfs<F, R>(block_size: usize, f: F) -> R
where
    F: FnOnce(&BlockVfs, &Path) -> R,
{
    let test_vfs = TestVfs::dir(block_size);
    let path = test_vfs.path().expect("Directory filesystem should have a path");
    f(&test_vfs.vfs, &path)
}

/// Deterministic non-repeating-looking bytes for test payloads.
pub fn patterned_bytes(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u32).wrapping_mul(2_654_435_761).rotate_left(seed as u32 % 32) as u8 ^ seed)
        .collect()
}
