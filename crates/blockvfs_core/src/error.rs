//! Error types for BlockVFS core.

use std::io;
use thiserror::Error;

/// Result type for virtual file and filesystem operations.
pub type VfsResult<T> = Result<T, VfsError>;

/// Errors that can occur in virtual file and filesystem operations.
///
/// A block that does not exist is never an error: it reads as zeroes.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The object store failed a request.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] blockvfs_store::StoreError),

    /// Reading an import source or writing an export sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `copy` was asked to replace a file whose key prefix contains the
    /// source, so deleting the destination would delete the source.
    #[error("cannot copy {src} over {dst}: {src} is stored under {dst}")]
    CopyIntoAncestor {
        /// Source file.
        src: String,
        /// Destination file.
        dst: String,
    },

    /// The request touches a block whose index does not fit the key format.
    #[error("block index {index} exceeds the maximum addressable block")]
    BlockIndexOutOfRange {
        /// The offending block index.
        index: u64,
    },
}
