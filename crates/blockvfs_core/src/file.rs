//! Virtual file backed by fixed-size block objects.

use crate::block::{block_index, blocks};
use crate::contract::{LockLevel, OpenFlags, SyncFlags, VfsFile};
use crate::error::{VfsError, VfsResult};
use crate::key::{block_dir, block_key, parse_block_index, MAX_BLOCK_INDEX};
use blockvfs_store::{ObjectMeta, ObjectStore};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Byte offset of the engine's lock page.
///
/// The engine never stores page data there, but writes the page right after
/// it. See [`VirtualFile::write`].
pub const LOCK_REGION_OFFSET: u64 = 1_073_741_824;

/// One logical file, stored as objects `prefix/0000000000`, `prefix/0000000001`, ...
///
/// Every block except the last one is kept at exactly `block_size` bytes, so
/// the file size is the sum of the block object sizes. Nothing is cached:
/// each call re-reads the store.
///
/// # Concurrency
///
/// A `VirtualFile` holds no lock. The caller must ensure a single writer
/// per prefix; concurrent writers race per block and can corrupt the file.
///
/// # Example
///
/// ```rust
/// use blockvfs_core::{OpenFlags, VfsFile, VirtualFile};
/// use blockvfs_store::InMemoryObjectStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryObjectStore::new());
/// let mut file = VirtualFile::new(store.clone(), "main.db", 4096, OpenFlags::READWRITE).unwrap();
/// file.write(&[7u8; 5000], 0).unwrap();
/// assert_eq!(file.file_size().unwrap(), 5000);
/// assert_eq!(store.object_count(), 2);
/// ```
pub struct VirtualFile {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    block_size: usize,
    flags: OpenFlags,
}

impl VirtualFile {
    /// Binds a file to the blocks under `prefix`.
    ///
    /// `block_size` must match every other writer of this prefix.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::InvalidConfig`] if `block_size` is zero.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        block_size: usize,
        flags: OpenFlags,
    ) -> VfsResult<Self> {
        if block_size == 0 {
            return Err(VfsError::InvalidConfig("block size must be non-zero".into()));
        }
        Ok(Self {
            store,
            prefix: prefix.into(),
            block_size,
            flags,
        })
    }

    /// Returns the key prefix identifying this file.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the flags the file was opened with.
    #[must_use]
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Fetches a block. A missing block is empty.
    fn fetch_block(&self, index: u64) -> VfsResult<Vec<u8>> {
        let key = block_key(&self.prefix, index);
        trace!(%key, "get block");
        match self.store.get(&key) {
            Ok(block) => Ok(block.unwrap_or_default()),
            Err(e) => {
                warn!(%key, error = %e, "block fetch failed");
                Err(e.into())
            }
        }
    }

    fn put_block(&self, index: u64, data: &[u8]) -> VfsResult<()> {
        let key = block_key(&self.prefix, index);
        trace!(%key, size = data.len(), "put block");
        self.store.put(&key, data).map_err(|e| {
            warn!(%key, error = %e, "block store failed");
            VfsError::from(e)
        })
    }

    fn delete_block(&self, index: u64) -> VfsResult<()> {
        let key = block_key(&self.prefix, index);
        trace!(%key, "delete block");
        self.store.delete(&key).map_err(|e| {
            warn!(%key, error = %e, "block delete failed");
            VfsError::from(e)
        })
    }

    /// Rejects a non-empty range whose blocks the key format cannot name.
    fn check_range(&self, offset: u64, len: usize) -> VfsResult<()> {
        let last = block_index(offset.saturating_add(len as u64 - 1), self.block_size);
        if last > MAX_BLOCK_INDEX || offset.checked_add(len as u64).is_none() {
            return Err(VfsError::BlockIndexOutOfRange { index: last });
        }
        Ok(())
    }

    fn list_blocks(&self) -> VfsResult<Vec<(u64, ObjectMeta)>> {
        list_blocks(self.store.as_ref(), &self.prefix)
    }

    /// Zero-pads short blocks between the lock page and `first_data_block`.
    ///
    /// The engine writes pages in ascending order but skips the lock page, so
    /// the blocks it covers may be short or missing. Walks down from the block
    /// before the new data and stops at the first full block.
    fn backfill_lock_region(&self, first_data_block: u64) -> VfsResult<()> {
        let lock_block = block_index(LOCK_REGION_OFFSET, self.block_size);

        for index in (lock_block..first_data_block).rev() {
            let mut block = self.fetch_block(index)?;
            if block.len() >= self.block_size {
                break;
            }
            debug!(prefix = %self.prefix, index, from = block.len(), "backfilling block");
            block.resize(self.block_size, 0);
            self.put_block(index, &block)?;
        }
        Ok(())
    }
}

/// Lists the block objects of the file at `prefix` in ascending index order.
///
/// Objects under the prefix that are not block keys are skipped.
pub(crate) fn list_blocks(store: &dyn ObjectStore, prefix: &str) -> VfsResult<Vec<(u64, ObjectMeta)>> {
    let listed = store.list(&block_dir(prefix)).map_err(|e| {
        warn!(prefix, error = %e, "block listing failed");
        VfsError::from(e)
    })?;
    Ok(listed
        .into_iter()
        .filter_map(|meta| parse_block_index(prefix, &meta.key).map(|i| (i, meta)))
        .collect())
}

impl fmt::Debug for VirtualFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFile")
            .field("prefix", &self.prefix)
            .field("block_size", &self.block_size)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl VfsFile for VirtualFile {
    fn read(&self, amount: usize, offset: u64) -> VfsResult<Vec<u8>> {
        if amount == 0 {
            return Ok(Vec::new());
        }
        self.check_range(offset, amount)?;
        debug!(prefix = %self.prefix, offset, amount, "read");

        let mut out = Vec::with_capacity(amount);
        for span in blocks(offset, amount, self.block_size) {
            let block = self.fetch_block(span.index)?;
            let target = out.len() + span.len;
            let available = block.len().min(span.end());
            if span.start < available {
                out.extend_from_slice(&block[span.start..available]);
            }
            out.resize(target, 0);
        }
        Ok(out)
    }

    /// Writes `data` at `offset`, one block request at a time.
    ///
    /// Whole aligned blocks are overwritten directly. Partial blocks are
    /// read, patched, and written back, keeping bytes outside the patched
    /// range. A write landing right after the lock page first backfills the
    /// blocks the engine skipped.
    ///
    /// Blocks are committed one by one; a failure part-way leaves earlier
    /// blocks updated.
    fn write(&mut self, data: &[u8], offset: u64) -> VfsResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        self.check_range(offset, data.len())?;

        debug!(prefix = %self.prefix, offset, len = data.len(), "write");

        if offset == LOCK_REGION_OFFSET + data.len() as u64 {
            self.backfill_lock_region(block_index(offset, self.block_size))?;
        }

        let mut consumed = 0;
        for span in blocks(offset, data.len(), self.block_size) {
            let chunk = &data[consumed..consumed + span.len];
            consumed += span.len;

            if span.is_full(self.block_size) {
                self.put_block(span.index, chunk)?;
                continue;
            }

            let mut block = self.fetch_block(span.index)?;
            if block.len() < span.end() {
                block.resize(span.end(), 0);
            }
            block[span.start..span.end()].copy_from_slice(chunk);
            self.put_block(span.index, &block)?;
        }
        Ok(())
    }

    /// Shrinks the file to `new_size` in one ascending pass over its blocks.
    ///
    /// Blocks wholly past the new end are deleted and the block holding the
    /// new end is cut short. Growing needs no work: the size is derived from
    /// the blocks.
    fn truncate(&mut self, new_size: u64) -> VfsResult<()> {
        debug!(prefix = %self.prefix, new_size, "truncate");

        let mut seen = 0u64;
        for (index, meta) in self.list_blocks()? {
            let keep = new_size.saturating_sub(seen);
            seen += meta.size;

            if keep == 0 {
                self.delete_block(index)?;
            } else if keep < meta.size {
                let mut block = self.fetch_block(index)?;
                block.truncate(keep as usize);
                self.put_block(index, &block)?;
            }
        }
        Ok(())
    }

    fn file_size(&self) -> VfsResult<u64> {
        let size: u64 = self.list_blocks()?.iter().map(|(_, meta)| meta.size).sum();
        trace!(prefix = %self.prefix, size, "file size");
        Ok(size)
    }

    fn sync(&mut self, flags: SyncFlags) -> VfsResult<()> {
        // Every successful write has already reached the store.
        trace!(prefix = %self.prefix, flags = flags.bits(), "sync");
        Ok(())
    }

    fn lock(&mut self, level: LockLevel) -> VfsResult<()> {
        trace!(prefix = %self.prefix, ?level, "lock");
        Ok(())
    }

    fn unlock(&mut self, level: LockLevel) -> VfsResult<()> {
        trace!(prefix = %self.prefix, ?level, "unlock");
        Ok(())
    }

    fn check_reserved_lock(&self) -> VfsResult<bool> {
        Ok(false)
    }

    fn file_control(&mut self, _op: i32) -> VfsResult<bool> {
        Ok(false)
    }

    fn sector_size(&self) -> usize {
        self.block_size
    }

    fn device_characteristics(&self) -> u32 {
        0
    }

    fn close(&mut self) -> VfsResult<()> {
        debug!(prefix = %self.prefix, "close");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockvfs_store::{InMemoryObjectStore, StoreError, StoreResult};

    const B: usize = 4096;

    fn open(store: &Arc<InMemoryObjectStore>, block_size: usize) -> VirtualFile {
        VirtualFile::new(store.clone(), "test.db", block_size, OpenFlags::READWRITE).unwrap()
    }

    fn object(store: &InMemoryObjectStore, index: u64) -> Option<Vec<u8>> {
        store.get(&block_key("test.db", index)).unwrap()
    }

    fn pattern(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
    }

    /// Store whose every request fails, like an unreachable bucket.
    struct Unreachable;

    impl ObjectStore for Unreachable {
        fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn put(&self, _key: &str, _data: &[u8]) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn delete(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn delete_prefix(&self, _prefix: &str) -> StoreResult<u64> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn list(&self, _prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn write_5000_bytes_makes_two_blocks() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        let data = pattern(5000, 1);

        file.write(&data, 0).unwrap();

        assert_eq!(store.keys(), ["test.db/0000000000", "test.db/0000000001"]);
        assert_eq!(object(&store, 0).unwrap(), &data[..4096]);
        assert_eq!(object(&store, 1).unwrap(), &data[4096..]);
        assert_eq!(file.file_size().unwrap(), 5000);
        assert_eq!(file.read(5000, 0).unwrap(), data);
    }

    #[test]
    fn read_unwritten_is_zero() {
        let store = Arc::new(InMemoryObjectStore::new());
        let file = open(&store, B);

        assert_eq!(file.read(10_000, 123).unwrap(), vec![0u8; 10_000]);
        assert_eq!(store.object_count(), 0);
    }

    #[test]
    fn read_zero_amount() {
        let file = VirtualFile::new(Arc::new(Unreachable), "x", B, OpenFlags::READONLY).unwrap();
        assert!(file.read(0, 77).unwrap().is_empty());
    }

    #[test]
    fn read_past_short_block_keeps_alignment() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.put(&block_key("test.db", 0), &[1u8; 100]).unwrap();
        store.put(&block_key("test.db", 1), &[2u8; 10]).unwrap();
        let file = open(&store, 16);

        let got = file.read(32, 0).unwrap();
        let mut expected = vec![1u8; 16];
        expected.extend_from_slice(&[2u8; 10]);
        expected.extend_from_slice(&[0u8; 6]);
        assert_eq!(got, expected);

        let got = file.read(8, 8).unwrap();
        assert_eq!(got, vec![1u8; 8]);
    }

    #[test]
    fn partial_write_preserves_neighbours() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        let base = pattern(3 * B, 9);
        file.write(&base, 0).unwrap();

        file.write(b"patch", 4094).unwrap();

        let mut expected = base.clone();
        expected[4094..4099].copy_from_slice(b"patch");
        assert_eq!(file.read(3 * B, 0).unwrap(), expected);
        assert_eq!(file.file_size().unwrap(), 3 * B as u64);
    }

    #[test]
    fn sparse_write_zero_fills_gap() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);

        file.write(b"tail", 10_000).unwrap();

        assert_eq!(store.object_count(), 1);
        assert_eq!(object(&store, 2).unwrap().len(), 10_000 - 8192 + 4);
        let got = file.read(10_004, 0).unwrap();
        assert!(got[..10_000].iter().all(|&b| b == 0));
        assert_eq!(&got[10_000..], b"tail");
    }

    #[test]
    fn aligned_full_block_overwrites() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        file.write(&pattern(2 * B, 3), 0).unwrap();

        let fresh = vec![0xEE; B];
        file.write(&fresh, B as u64).unwrap();

        assert_eq!(object(&store, 1).unwrap(), fresh);
        assert_eq!(file.read(B, 0).unwrap(), pattern(B, 3));
    }

    #[test]
    fn empty_write_is_noop() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        file.write(&[], 1 << 20).unwrap();
        assert_eq!(store.object_count(), 0);
    }

    #[test]
    fn truncate_shrinks_mid_block() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        let data = pattern(3 * B + 10, 4);
        file.write(&data, 0).unwrap();

        file.truncate(5000).unwrap();

        assert_eq!(file.file_size().unwrap(), 5000);
        assert_eq!(store.object_count(), 2);
        assert_eq!(object(&store, 1).unwrap().len(), 5000 - B);
        assert_eq!(file.read(5000, 0).unwrap(), &data[..5000]);
        assert_eq!(file.read(1000, 5000).unwrap(), vec![0u8; 1000]);
    }

    #[test]
    fn truncate_on_block_boundary() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        file.write(&pattern(3 * B, 4), 0).unwrap();

        file.truncate(B as u64).unwrap();

        assert_eq!(store.keys(), ["test.db/0000000000"]);
        assert_eq!(file.file_size().unwrap(), B as u64);
    }

    #[test]
    fn truncate_to_zero_removes_everything() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        file.write(&pattern(9000, 4), 0).unwrap();

        file.truncate(0).unwrap();

        assert_eq!(store.object_count(), 0);
        assert_eq!(file.file_size().unwrap(), 0);
    }

    #[test]
    fn truncate_larger_is_noop() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        file.write(&pattern(5000, 4), 0).unwrap();

        file.truncate(1 << 30).unwrap();

        assert_eq!(file.file_size().unwrap(), 5000);
        assert_eq!(file.read(5000, 0).unwrap(), pattern(5000, 4));
    }

    #[test]
    fn size_ignores_foreign_objects() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.put("test.db/0000000000", b"abc").unwrap();
        store.put("test.db/journal/0000000000", b"zzzzzz").unwrap();
        store.put("test.dbx/0000000000", b"zzzzzz").unwrap();
        let mut file = open(&store, B);

        assert_eq!(file.file_size().unwrap(), 3);
        file.truncate(0).unwrap();
        assert_eq!(store.object_count(), 2);
    }

    #[test]
    fn lock_region_write_backfills_lock_block() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);
        let head = pattern(100, 5);
        file.write(&head, 0).unwrap();

        let page = pattern(B, 6);
        file.write(&page, LOCK_REGION_OFFSET + B as u64).unwrap();

        let lock_block = block_index(LOCK_REGION_OFFSET, B);
        assert_eq!(object(&store, lock_block).unwrap(), vec![0u8; B]);
        assert_eq!(object(&store, lock_block + 1).unwrap(), page);
        assert_eq!(file.read(100, 0).unwrap(), head);
        assert_eq!(object(&store, 0).unwrap().len(), 100);
    }

    #[test]
    fn lock_region_backfill_stops_at_full_block() {
        let store = Arc::new(InMemoryObjectStore::new());
        let block_size = 512;
        let mut file = open(&store, block_size);
        let lock_block = block_index(LOCK_REGION_OFFSET, block_size);

        store.put(&block_key("test.db", lock_block - 1), &[9u8; 10]).unwrap();
        store.put(&block_key("test.db", lock_block), &[8u8; 512]).unwrap();
        store.put(&block_key("test.db", lock_block + 1), &[7u8; 100]).unwrap();

        let page = vec![1u8; 1024];
        file.write(&page, LOCK_REGION_OFFSET + 1024).unwrap();

        let padded = object(&store, lock_block + 1).unwrap();
        assert_eq!(padded.len(), 512);
        assert_eq!(&padded[..100], &[7u8; 100][..]);
        assert!(padded[100..].iter().all(|&b| b == 0));
        assert_eq!(object(&store, lock_block).unwrap(), vec![8u8; 512]);
        assert_eq!(object(&store, lock_block - 1).unwrap(), vec![9u8; 10]);
    }

    #[test]
    fn other_offsets_do_not_backfill() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut file = open(&store, B);

        file.write(&[1u8; 100], LOCK_REGION_OFFSET + B as u64).unwrap();

        assert_eq!(store.object_count(), 1);
    }

    #[test]
    fn write_beyond_key_space_fails_without_requests() {
        let mut file = VirtualFile::new(Arc::new(Unreachable), "x", B, OpenFlags::READWRITE).unwrap();
        let offset = (MAX_BLOCK_INDEX + 1) * B as u64;

        let result = file.write(b"x", offset);
        assert!(matches!(result, Err(VfsError::BlockIndexOutOfRange { .. })));
    }

    #[test]
    fn read_beyond_key_space_fails_without_requests() {
        let file = VirtualFile::new(Arc::new(Unreachable), "x", B, OpenFlags::READONLY).unwrap();

        let result = file.read(10, u64::MAX - 5);
        assert!(matches!(result, Err(VfsError::BlockIndexOutOfRange { .. })));

        let result = file.read(10, (MAX_BLOCK_INDEX + 1) * B as u64);
        assert!(matches!(
            result,
            Err(VfsError::BlockIndexOutOfRange { index }) if index == MAX_BLOCK_INDEX + 1
        ));
    }

    #[test]
    fn read_of_last_addressable_byte() {
        let store = Arc::new(InMemoryObjectStore::new());
        let file = open(&store, B);
        let last = (MAX_BLOCK_INDEX + 1) * B as u64 - 1;

        assert_eq!(file.read(1, last).unwrap(), [0u8]);
        assert!(file.read(2, last).is_err());
    }

    #[test]
    fn zero_block_size_rejected() {
        let result = VirtualFile::new(Arc::new(Unreachable), "x", 0, OpenFlags::READWRITE);
        assert!(matches!(result, Err(VfsError::InvalidConfig(_))));
    }

    #[test]
    fn store_failures_surface_as_storage_unavailable() {
        let mut file = VirtualFile::new(Arc::new(Unreachable), "x", B, OpenFlags::READWRITE).unwrap();

        assert!(matches!(file.read(10, 0), Err(VfsError::StorageUnavailable(_))));
        assert!(matches!(file.write(&[0u8; B], 0), Err(VfsError::StorageUnavailable(_))));
        assert!(matches!(file.truncate(0), Err(VfsError::StorageUnavailable(_))));
        assert!(matches!(file.file_size(), Err(VfsError::StorageUnavailable(_))));
    }

    #[test]
    fn locking_and_control_are_noops() {
        let mut file = VirtualFile::new(Arc::new(Unreachable), "x", B, OpenFlags::READWRITE).unwrap();

        file.lock(LockLevel::Exclusive).unwrap();
        assert!(!file.check_reserved_lock().unwrap());
        file.unlock(LockLevel::None).unwrap();
        file.sync(SyncFlags::FULL).unwrap();
        assert!(!file.file_control(18).unwrap());
        assert_eq!(file.sector_size(), B);
        assert_eq!(file.device_characteristics(), 0);
        file.close().unwrap();
    }

    #[test]
    fn accessors() {
        let store = Arc::new(InMemoryObjectStore::new());
        let file = open(&store, 1024);
        assert_eq!(file.prefix(), "test.db");
        assert_eq!(file.block_size(), 1024);
        assert_eq!(file.flags(), OpenFlags::READWRITE);
        assert!(format!("{file:?}").contains("test.db"));
    }
}
