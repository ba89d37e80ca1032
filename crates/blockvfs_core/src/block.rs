//! Block addressing.
//!
//! Splits a byte range of a logical file into per-block pieces. Reads and
//! writes both go through [`blocks`], so they always agree on where a byte
//! lives.

use std::iter::FusedIterator;

/// The part of one block touched by a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Index of the block within the file.
    pub index: u64,
    /// Offset of the first touched byte inside the block.
    pub start: usize,
    /// Number of touched bytes inside the block.
    pub len: usize,
}

impl BlockSpan {
    /// Returns true if the span covers the whole block.
    #[must_use]
    pub const fn is_full(&self, block_size: usize) -> bool {
        self.start == 0 && self.len == block_size
    }

    /// Offset one past the last touched byte inside the block.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Iterator over the [`BlockSpan`]s of a byte range, ascending.
///
/// Cloning the iterator restarts the walk from the clone point.
#[derive(Debug, Clone)]
pub struct BlockRange {
    block_size: u64,
    offset: u64,
    remaining: u64,
}

/// Returns the spans covering `[offset, offset + amount)` with blocks of
/// `block_size` bytes.
///
/// `block_size` must be non-zero; [`crate::Config::validate`] guarantees it
/// for every filesystem-created file. A range running past `u64::MAX` stops
/// at the last addressable byte.
#[must_use]
pub fn blocks(offset: u64, amount: usize, block_size: usize) -> BlockRange {
    debug_assert!(block_size > 0, "block size must be non-zero");
    BlockRange {
        block_size: block_size as u64,
        offset,
        remaining: amount as u64,
    }
}

/// Index of the block holding byte `offset`.
#[must_use]
pub const fn block_index(offset: u64, block_size: usize) -> u64 {
    offset / block_size as u64
}

impl Iterator for BlockRange {
    type Item = BlockSpan;

    fn next(&mut self) -> Option<BlockSpan> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.offset / self.block_size;
        let start = self.offset % self.block_size;
        let len = (self.block_size - start).min(self.remaining);

        match self.offset.checked_add(len) {
            Some(next) => {
                self.offset = next;
                self.remaining -= len;
            }
            // Last addressable byte reached
            None => self.remaining = 0,
        }

        Some(BlockSpan {
            index,
            start: start as usize,
            len: len as usize,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.remaining == 0 {
            return (0, Some(0));
        }
        let first = self.offset / self.block_size;
        let last = self.offset.saturating_add(self.remaining - 1) / self.block_size;
        let n = (last - first + 1) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BlockRange {}

impl FusedIterator for BlockRange {}
