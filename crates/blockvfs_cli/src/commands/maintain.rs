//! Truncate and rm commands.

use super::Target;
use crate::error::{CliError, CliResult};
use blockvfs_core::{AccessFlags, OpenFlags, Vfs, VfsFile};
use tracing::info;

/// Shrinks `prefix` to `size` bytes.
///
/// Growing is a no-op, as it is for the engine.
pub fn truncate(target: &Target, prefix: &str, size: u64) -> CliResult<()> {
    let vfs = target.open()?;
    if !vfs.exists(prefix, AccessFlags::Exists)? {
        return Err(CliError::NotFound(prefix.to_owned()));
    }

    let mut file = vfs.open(prefix, OpenFlags::READWRITE)?;
    let before = file.file_size()?;
    file.truncate(size)?;
    let after = file.file_size()?;
    file.close()?;

    info!(prefix, before, after, "truncated");
    println!("✓ {}: {} -> {} bytes", prefix, before, after);
    Ok(())
}

/// Deletes every block of `prefix`. Deleting a missing file succeeds.
pub fn rm(target: &Target, prefix: &str) -> CliResult<()> {
    let vfs = target.open()?;
    vfs.delete(prefix, false)?;
    println!("✓ Removed {}", prefix);
    Ok(())
}
