//! CLI error type.

use blockvfs_core::VfsError;
use blockvfs_store::StoreError;
use std::io;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors a CLI command can report.
#[derive(Debug, Error)]
pub enum CliError {
    /// The bucket directory could not be opened.
    #[error("cannot open bucket {path}: {source}")]
    Bucket {
        /// Bucket directory.
        path: String,
        /// Underlying failure.
        source: StoreError,
    },

    /// A filesystem operation failed.
    #[error(transparent)]
    Vfs(#[from] VfsError),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `--format` named an unknown format.
    #[error("unknown output format {0:?} (expected text or json)")]
    UnknownFormat(String),

    /// The requested range does not fit in memory on this platform.
    #[error("range of {0} bytes is too large to read at once")]
    RangeTooLarge(u64),

    /// The named file has no blocks.
    #[error("no such file: {0}")]
    NotFound(String),
}
