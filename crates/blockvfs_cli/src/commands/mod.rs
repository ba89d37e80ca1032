//! CLI command implementations.

pub mod cat;
pub mod inspect;
pub mod maintain;
pub mod transfer;

use crate::error::{CliError, CliResult};
use blockvfs_core::{BlockVfs, Config};
use blockvfs_store::DirObjectStore;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// The bucket a command operates on.
#[derive(Debug, Clone)]
pub struct Target {
    root: PathBuf,
    bucket: String,
    block_size: usize,
}

impl Target {
    /// Creates a target for `<root>/<bucket>`.
    pub fn new(root: PathBuf, bucket: String, block_size: usize) -> Self {
        Self {
            root,
            bucket,
            block_size,
        }
    }

    /// Returns the bucket directory.
    pub fn bucket_path(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    /// Opens the filesystem over the bucket directory, creating it if needed.
    pub fn open(&self) -> CliResult<BlockVfs> {
        let path = self.bucket_path();
        let store = DirObjectStore::open(&path).map_err(|source| CliError::Bucket {
            path: path.display().to_string(),
            source,
        })?;
        let config = Config::new()
            .bucket(self.bucket.clone())
            .block_size(self.block_size);
        Ok(BlockVfs::new(Arc::new(store), config)?)
    }
}

/// Output format of the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for Format {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_owned())),
        }
    }
}

/// Formats a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!("text".parse::<Format>().unwrap(), Format::Text);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert!(matches!(
            "yaml".parse::<Format>(),
            Err(CliError::UnknownFormat(f)) if f == "yaml"
        ));
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(100), "100 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.50 MB");
        assert_eq!(format_size(1 << 30), "1.00 GB");
    }

    #[test]
    fn target_opens_bucket_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let target = Target::new(dir.path().to_path_buf(), "b".into(), 512);

        let vfs = target.open().unwrap();

        assert!(dir.path().join("b").is_dir());
        assert_eq!(vfs.config().block_size, 512);
        assert_eq!(vfs.config().bucket, "b");
    }

    #[test]
    fn target_rejects_zero_block_size() {
        let dir = tempfile::tempdir().unwrap();
        let target = Target::new(dir.path().to_path_buf(), "b".into(), 0);
        assert!(matches!(target.open(), Err(CliError::Vfs(_))));
    }
}
