//! Whole-file export and import.
//!
//! Export turns the blocks of a file back into one byte stream
//! ([`BlockReader`]). Import cuts any byte source into block-sized objects
//! ([`write_blocks`]). [`ChunkReader`] adapts an iterator of byte chunks of
//! arbitrary sizes into a reader so either side can be fed from one.

use crate::error::{VfsError, VfsResult};
use crate::key::{block_key, MAX_BLOCK_INDEX};
use blockvfs_store::ObjectStore;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Streams the blocks of one file, in index order, as a single byte sequence.
///
/// The block list is taken when the reader is created; block content is
/// fetched one object at a time as the reader advances. A block deleted in
/// between reads as empty. The reader is single pass.
pub struct BlockReader {
    store: Arc<dyn ObjectStore>,
    keys: std::vec::IntoIter<String>,
    current: Vec<u8>,
    pos: usize,
}

impl BlockReader {
    pub(crate) fn new(store: Arc<dyn ObjectStore>, keys: Vec<String>) -> Self {
        Self {
            store,
            keys: keys.into_iter(),
            current: Vec::new(),
            pos: 0,
        }
    }

    /// Number of blocks not yet fetched.
    #[must_use]
    pub fn remaining_blocks(&self) -> usize {
        self.keys.len()
    }

    /// Loads the next non-empty block. Returns false at the end of the file.
    fn advance(&mut self) -> VfsResult<bool> {
        for key in self.keys.by_ref() {
            trace!(%key, "streaming block");
            let block = self.store.get(&key).map_err(|e| {
                warn!(%key, error = %e, "block fetch failed during export");
                VfsError::from(e)
            })?;
            if let Some(block) = block.filter(|b| !b.is_empty()) {
                self.current = block;
                self.pos = 0;
                return Ok(true);
            }
        }
        self.current.clear();
        self.pos = 0;
        Ok(false)
    }

    /// Returns up to `max` bytes, crossing block boundaries as needed.
    ///
    /// Fewer than `max` bytes are returned only at the end of the file; an
    /// empty vector means the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if a block fetch fails.
    pub fn read_chunk(&mut self, max: usize) -> VfsResult<Vec<u8>> {
        let mut out = Vec::with_capacity(max.min(1 << 20));
        while out.len() < max {
            if self.pos == self.current.len() && !self.advance()? {
                break;
            }
            let n = (max - out.len()).min(self.current.len() - self.pos);
            out.extend_from_slice(&self.current[self.pos..self.pos + n]);
            self.pos += n;
        }
        Ok(out)
    }
}

impl Read for BlockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos == self.current.len() && !self.advance().map_err(io::Error::other)? {
            return Ok(0);
        }
        let n = buf.len().min(self.current.len() - self.pos);
        buf[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl fmt::Debug for BlockReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockReader")
            .field("remaining_blocks", &self.keys.len())
            .field("buffered", &(self.current.len() - self.pos))
            .finish_non_exhaustive()
    }
}

/// Reads from an iterator of byte chunks, whatever their sizes.
pub struct ChunkReader<I: Iterator> {
    chunks: I,
    current: Option<I::Item>,
    pos: usize,
}

impl<I> ChunkReader<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    /// Wraps a chunk iterator.
    pub fn new(chunks: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            chunks: chunks.into_iter(),
            current: None,
            pos: 0,
        }
    }
}

impl<I> Read for ChunkReader<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if let Some(chunk) = &self.current {
                let chunk = chunk.as_ref();
                if self.pos < chunk.len() {
                    let n = buf.len().min(chunk.len() - self.pos);
                    buf[..n].copy_from_slice(&chunk[self.pos..self.pos + n]);
                    self.pos += n;
                    return Ok(n);
                }
            }
            match self.chunks.next() {
                Some(chunk) => {
                    self.current = Some(chunk);
                    self.pos = 0;
                }
                None => {
                    self.current = None;
                    return Ok(0);
                }
            }
        }
    }
}

impl<I: Iterator> fmt::Debug for ChunkReader<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkReader")
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

/// Fills `buf` from `source` until it is full or the source ends.
fn fill<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Stores `source` as consecutive blocks `prefix/0000000000`, `prefix/0000000001`, ...
///
/// Each block is exactly `block_size` bytes except a short final one, which
/// ends the import. Blocks already stored at those indices are replaced;
/// blocks at higher indices are left alone, so callers importing over an
/// existing file should delete it first.
///
/// Returns the number of blocks written.
pub(crate) fn write_blocks<R: Read>(
    store: &dyn ObjectStore,
    prefix: &str,
    block_size: usize,
    mut source: R,
) -> VfsResult<u64> {
    let mut buf = vec![0u8; block_size];
    let mut index = 0u64;

    loop {
        let filled = fill(&mut source, &mut buf)?;
        if filled == 0 {
            break;
        }
        if index > MAX_BLOCK_INDEX {
            return Err(VfsError::BlockIndexOutOfRange { index });
        }

        let key = block_key(prefix, index);
        trace!(%key, size = filled, "importing block");
        store.put(&key, &buf[..filled]).map_err(|e| {
            warn!(%key, error = %e, "block store failed during import");
            VfsError::from(e)
        })?;
        index += 1;

        if filled < block_size {
            break;
        }
    }

    debug!(prefix, blocks = index, "import finished");
    Ok(index)
}
