//! Export and import commands.
//!
//! Both stream: a file never has to fit in memory.

use super::Target;
use crate::error::CliResult;
use blockvfs_core::{BlockVfs, Vfs};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Streams `prefix` into `output` (`-` for stdout).
pub fn export(target: &Target, prefix: &str, output: &Path) -> CliResult<()> {
    let vfs = target.open()?;

    let written = if is_stdio(output) {
        export_to(&vfs, prefix, io::stdout().lock())?
    } else {
        let file = File::create(output)?;
        let written = export_to(&vfs, prefix, BufWriter::new(&file))?;
        file.sync_all()?;
        written
    };

    info!(prefix, bytes = written, "exported");
    Ok(())
}

/// Streams `prefix` into `sink` and returns the number of bytes copied.
pub fn export_to<W: Write>(vfs: &BlockVfs, prefix: &str, mut sink: W) -> CliResult<u64> {
    let mut reader = vfs.serialize(prefix)?;
    let written = io::copy(&mut reader, &mut sink)?;
    sink.flush()?;
    Ok(written)
}

/// Stores `input` (`-` for stdin) as `prefix`.
///
/// Unless `keep_existing` is set the file is deleted first, so a shorter
/// import does not leave stale blocks behind.
pub fn import(target: &Target, prefix: &str, input: &Path, keep_existing: bool) -> CliResult<()> {
    let vfs = target.open()?;

    let blocks = if is_stdio(input) {
        import_from(&vfs, prefix, io::stdin().lock(), keep_existing)?
    } else {
        import_from(&vfs, prefix, BufReader::new(File::open(input)?), keep_existing)?
    };

    println!("✓ Imported {} into {}", prefix, target.bucket_path().display());
    println!("  Blocks: {}", blocks);
    println!("  Block size: {} bytes", vfs.config().block_size);
    Ok(())
}

/// Stores `source` as `prefix` and returns the number of blocks written.
pub fn import_from<R: Read>(
    vfs: &BlockVfs,
    prefix: &str,
    source: R,
    keep_existing: bool,
) -> CliResult<u64> {
    if !keep_existing {
        vfs.delete(prefix, false)?;
    }
    Ok(vfs.deserialize(prefix, source)?)
}
