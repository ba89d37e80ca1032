//! Cat command implementation.

use super::Target;
use crate::error::{CliError, CliResult};
use blockvfs_core::{BlockVfs, OpenFlags, Vfs, VfsFile};
use std::io::{self, Write};

/// Bytes per hex dump line.
const LINE: usize = 16;

/// Runs the cat command.
///
/// Without `length` reads to the end of the file. Output is a hex dump
/// unless `raw` is set.
pub fn run(
    target: &Target,
    prefix: &str,
    offset: u64,
    length: Option<usize>,
    raw: bool,
) -> CliResult<()> {
    let data = read_range(&target.open()?, prefix, offset, length)?;

    let mut stdout = io::stdout().lock();
    if raw {
        stdout.write_all(&data)?;
    } else {
        for line in hex_dump(&data, offset) {
            writeln!(stdout, "{}", line)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Reads `length` bytes at `offset`, or up to the end of the file.
pub fn read_range(
    vfs: &BlockVfs,
    prefix: &str,
    offset: u64,
    length: Option<usize>,
) -> CliResult<Vec<u8>> {
    if !vfs.exists(prefix, blockvfs_core::AccessFlags::Exists)? {
        return Err(CliError::NotFound(prefix.to_owned()));
    }
    let file = vfs.open(prefix, OpenFlags::READONLY)?;
    let amount = match length {
        Some(n) => n,
        None => remaining_len(file.file_size()?, offset)?,
    };
    Ok(file.read(amount, offset)?)
}

/// Bytes between `offset` and the end of a file of `size` bytes.
fn remaining_len(size: u64, offset: u64) -> CliResult<usize> {
    let remaining = size.saturating_sub(offset);
    usize::try_from(remaining).map_err(|_| CliError::RangeTooLarge(remaining))
}

/// Formats `data` as `offset  hex  |ascii|` lines.
pub fn hex_dump(data: &[u8], base: u64) -> Vec<String> {
    data.chunks(LINE)
        .enumerate()
        .map(|(i, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!(
                "{:010x}  {:<width$}  |{}|",
                base + (i * LINE) as u64,
                hex.join(" "),
                ascii,
                width = LINE * 3 - 1
            )
        })
        .collect()
}
