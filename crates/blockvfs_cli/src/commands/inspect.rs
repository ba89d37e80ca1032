//! Size and listing commands.

use super::{format_size, Format, Target};
use crate::error::CliResult;
use blockvfs_core::{parse_block_index, BlockVfs, OpenFlags, Vfs, VfsFile};
use blockvfs_store::ObjectStore;
use serde::Serialize;

/// Size report for one file.
#[derive(Debug, Serialize)]
pub struct SizeReport {
    /// File name.
    pub prefix: String,
    /// Size in bytes.
    pub size: u64,
    /// Block size in bytes.
    pub block_size: usize,
}

/// One block object of a file.
#[derive(Debug, Serialize)]
pub struct BlockEntry {
    /// Block index.
    pub index: u64,
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
}

/// Runs the size command.
pub fn size(target: &Target, prefix: &str, format: Format) -> CliResult<()> {
    let report = size_report(&target.open()?, prefix)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => println!("{}: {} ({})", report.prefix, report.size, format_size(report.size)),
    }
    Ok(())
}

/// Computes the size report of `prefix`.
pub fn size_report(vfs: &BlockVfs, prefix: &str) -> CliResult<SizeReport> {
    let file = vfs.open(prefix, OpenFlags::READONLY)?;
    Ok(SizeReport {
        prefix: prefix.to_owned(),
        size: file.file_size()?,
        block_size: file.block_size(),
    })
}

/// Runs the ls command.
pub fn ls(target: &Target, prefix: &str, format: Format) -> CliResult<()> {
    let entries = block_entries(&target.open()?, prefix)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        Format::Text => print_text_listing(prefix, &entries),
    }
    Ok(())
}

/// Lists the block objects of `prefix` in block order.
pub fn block_entries(vfs: &BlockVfs, prefix: &str) -> CliResult<Vec<BlockEntry>> {
    let listed = vfs
        .store()
        .list(&blockvfs_core::block_dir(prefix))
        .map_err(blockvfs_core::VfsError::from)?;
    Ok(listed
        .into_iter()
        .filter_map(|meta| {
            parse_block_index(prefix, &meta.key).map(|index| BlockEntry {
                index,
                key: meta.key,
                size: meta.size,
            })
        })
        .collect())
}

fn print_text_listing(prefix: &str, entries: &[BlockEntry]) {
    if entries.is_empty() {
        println!("{}: no blocks", prefix);
        return;
    }
    for entry in entries {
        println!("{:>10}  {}", entry.size, entry.key);
    }
    let total: u64 = entries.iter().map(|e| e.size).sum();
    println!("{} blocks, {}", entries.len(), format_size(total));
}
