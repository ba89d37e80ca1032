//! Virtual filesystem configuration.

use crate::error::{VfsError, VfsResult};

/// Default size of one block object, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Default name under which the filesystem registers with the engine.
pub const DEFAULT_VFS_NAME: &str = "blockvfs";

/// Configuration for a [`crate::BlockVfs`].
///
/// The block size must be identical for every writer of a given prefix.
/// Mixing block sizes on one logical file corrupts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name the filesystem registers under.
    pub name: String,

    /// Bucket holding the block objects.
    pub bucket: String,

    /// Size of one block object in bytes.
    pub block_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_VFS_NAME.to_owned(),
            bucket: DEFAULT_VFS_NAME.to_owned(),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the registration name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the bucket.
    #[must_use]
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Sets the block size.
    #[must_use]
    pub const fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::InvalidConfig`] if the block size is zero or the
    /// name is empty.
    pub fn validate(&self) -> VfsResult<()> {
        if self.block_size == 0 {
            return Err(VfsError::InvalidConfig("block size must be non-zero".into()));
        }
        if self.name.is_empty() {
            return Err(VfsError::InvalidConfig("vfs name must not be empty".into()));
        }
        Ok(())
    }
}
