//! Block object key format.
//!
//! Block `n` of the file with prefix `p` is stored under `p/nnnnnnnnnn`, the
//! index written in base 10 and zero-padded to [`INDEX_WIDTH`] digits. The
//! padding makes lexicographic listing order equal to block order.

/// Number of digits in a block index.
pub const INDEX_WIDTH: usize = 10;

/// Largest block index the key format can express.
pub const MAX_BLOCK_INDEX: u64 = 9_999_999_999;

/// Returns the key of block `index` of the file at `prefix`.
#[must_use]
pub fn block_key(prefix: &str, index: u64) -> String {
    format!("{prefix}/{index:0width$}", width = INDEX_WIDTH)
}

/// Returns the listing prefix shared by every block of the file at `prefix`.
#[must_use]
pub fn block_dir(prefix: &str) -> String {
    format!("{prefix}/")
}

/// Parses the block index out of `key`, if `key` is a block of `prefix`.
///
/// Objects nested deeper under the prefix, or with a non-numeric tail, are
/// not blocks of this file.
#[must_use]
pub fn parse_block_index(prefix: &str, key: &str) -> Option<u64> {
    let tail = key.strip_prefix(prefix)?.strip_prefix('/')?;
    if tail.len() != INDEX_WIDTH || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}
