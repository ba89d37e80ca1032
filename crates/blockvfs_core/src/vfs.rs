//! Virtual filesystem over an object store bucket.

use crate::config::Config;
use crate::contract::{AccessFlags, OpenFlags, Vfs};
use crate::error::{VfsError, VfsResult};
use crate::file::{list_blocks, VirtualFile};
use crate::key::block_dir;
use crate::stream::{write_blocks, BlockReader, ChunkReader};
use blockvfs_store::ObjectStore;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A filesystem whose files are sets of block objects in one bucket.
///
/// File names are used verbatim as key prefixes. A file exists exactly when
/// at least one of its blocks does; there is no separate metadata record.
///
/// # Example
///
/// ```rust
/// use blockvfs_core::{AccessFlags, BlockVfs, Config, OpenFlags, Vfs, VfsFile};
/// use blockvfs_store::InMemoryObjectStore;
/// use std::sync::Arc;
///
/// let vfs = BlockVfs::new(Arc::new(InMemoryObjectStore::new()), Config::default()).unwrap();
/// let mut file = vfs.open("main.db", OpenFlags::READWRITE | OpenFlags::CREATE).unwrap();
/// file.write(b"SQLite format 3\0", 0).unwrap();
/// assert!(vfs.exists("main.db", AccessFlags::Exists).unwrap());
///
/// let mut exported = Vec::new();
/// std::io::copy(&mut vfs.serialize("main.db").unwrap(), &mut exported).unwrap();
/// assert_eq!(&exported[..6], b"SQLite");
/// ```
pub struct BlockVfs {
    store: Arc<dyn ObjectStore>,
    config: Config,
}

impl BlockVfs {
    /// Creates a filesystem over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::InvalidConfig`] if the configuration is invalid.
    pub fn new(store: Arc<dyn ObjectStore>, config: Config) -> VfsResult<Self> {
        config.validate()?;
        info!(
            name = %config.name,
            bucket = %config.bucket,
            block_size = config.block_size,
            "block vfs ready"
        );
        Ok(Self { store, config })
    }

    /// Returns the name the filesystem registers under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Streams the content of `prefix` as one byte sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocks cannot be listed. Fetch failures
    /// surface later, from the reader.
    pub fn serialize(&self, prefix: &str) -> VfsResult<BlockReader> {
        let keys: Vec<String> = list_blocks(self.store.as_ref(), prefix)?
            .into_iter()
            .map(|(_, meta)| meta.key)
            .collect();
        debug!(prefix, blocks = keys.len(), "export started");
        Ok(BlockReader::new(Arc::clone(&self.store), keys))
    }

    /// Stores the bytes of `source` as the blocks of `prefix`, starting at
    /// block 0, and returns the number of blocks written.
    ///
    /// Existing blocks past the imported length are kept. Call
    /// [`Vfs::delete`] first when the new content may be shorter than the old.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or a block cannot be stored.
    /// Blocks stored before the failure remain.
    pub fn deserialize<R: Read>(&self, prefix: &str, source: R) -> VfsResult<u64> {
        debug!(prefix, "import started");
        write_blocks(self.store.as_ref(), prefix, self.config.block_size, source)
    }

    /// Like [`BlockVfs::deserialize`], reading from an iterator of byte
    /// chunks of any sizes.
    ///
    /// # Errors
    ///
    /// Returns an error if a block cannot be stored.
    pub fn deserialize_chunks<I>(&self, prefix: &str, chunks: I) -> VfsResult<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.deserialize(prefix, ChunkReader::new(chunks))
    }

    /// Replaces the content of `dst` with the content of `src`.
    ///
    /// Returns the number of blocks written.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::CopyIntoAncestor`] if `src` lies under `dst`
    /// (`copy("a/b", "a")`), and an error if any store request fails.
    pub fn copy(&self, src: &str, dst: &str) -> VfsResult<u64> {
        if src == dst {
            return Ok(list_blocks(self.store.as_ref(), src)?.len() as u64);
        }
        if src.starts_with(&block_dir(dst)) {
            return Err(VfsError::CopyIntoAncestor {
                src: src.to_owned(),
                dst: dst.to_owned(),
            });
        }
        self.delete(dst, false)?;
        let reader = self.serialize(src)?;
        self.deserialize(dst, reader)
    }
}

impl fmt::Debug for BlockVfs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockVfs")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Vfs for BlockVfs {
    type File = VirtualFile;

    /// Only [`AccessFlags::Exists`] consults the store; every other access
    /// check is granted.
    fn exists(&self, name: &str, access: AccessFlags) -> VfsResult<bool> {
        if access != AccessFlags::Exists {
            return Ok(true);
        }
        let found = !list_blocks(self.store.as_ref(), name)?.is_empty();
        debug!(name, found, "exists");
        Ok(found)
    }

    fn full_path(&self, name: &str) -> VfsResult<String> {
        Ok(name.to_owned())
    }

    fn delete(&self, name: &str, _sync_dir: bool) -> VfsResult<()> {
        let removed = self.store.delete_prefix(&block_dir(name)).map_err(|e| {
            warn!(name, error = %e, "delete failed");
            VfsError::from(e)
        })?;
        debug!(name, removed, "delete");
        Ok(())
    }

    fn open(&self, name: &str, flags: OpenFlags) -> VfsResult<VirtualFile> {
        debug!(name, flags = flags.bits(), "open");
        VirtualFile::new(Arc::clone(&self.store), name, self.config.block_size, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::VfsFile;
    use blockvfs_store::InMemoryObjectStore;

    fn vfs_with(block_size: usize) -> (Arc<InMemoryObjectStore>, BlockVfs) {
        let store = Arc::new(InMemoryObjectStore::new());
        let vfs = BlockVfs::new(store.clone(), Config::new().block_size(block_size)).unwrap();
        (store, vfs)
    }

    fn export(vfs: &BlockVfs, prefix: &str) -> Vec<u8> {
        let mut out = Vec::new();
        vfs.serialize(prefix).unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn rejects_invalid_config() {
        let store = Arc::new(InMemoryObjectStore::new());
        let result = BlockVfs::new(store, Config::new().block_size(0));
        assert!(matches!(result, Err(VfsError::InvalidConfig(_))));
    }

    #[test]
    fn exists_tracks_blocks() {
        let (_, vfs) = vfs_with(4096);
        assert!(!vfs.exists("a.db", AccessFlags::Exists).unwrap());
        assert!(vfs.exists("a.db", AccessFlags::ReadWrite).unwrap());
        assert!(vfs.exists("a.db", AccessFlags::Read).unwrap());

        let mut file = vfs.open("a.db", OpenFlags::READWRITE | OpenFlags::CREATE).unwrap();
        assert!(!vfs.exists("a.db", AccessFlags::Exists).unwrap());
        file.write(b"x", 0).unwrap();
        assert!(vfs.exists("a.db", AccessFlags::Exists).unwrap());
        assert!(!vfs.exists("a", AccessFlags::Exists).unwrap());
    }

    #[test]
    fn full_path_is_identity() {
        let (_, vfs) = vfs_with(4096);
        assert_eq!(vfs.full_path("dir/main.db").unwrap(), "dir/main.db");
    }

    #[test]
    fn delete_is_idempotent_and_scoped() {
        let (store, vfs) = vfs_with(16);
        vfs.open("a", OpenFlags::READWRITE).unwrap().write(&[1u8; 40], 0).unwrap();
        vfs.open("ab", OpenFlags::READWRITE).unwrap().write(&[2u8; 40], 0).unwrap();

        vfs.delete("a", true).unwrap();
        vfs.delete("a", true).unwrap();
        vfs.delete("never-existed", false).unwrap();

        assert!(!vfs.exists("a", AccessFlags::Exists).unwrap());
        assert_eq!(store.object_count(), 3);
    }

    #[test]
    fn open_uses_config_block_size() {
        let (_, vfs) = vfs_with(512);
        let file = vfs.open("x", OpenFlags::READONLY).unwrap();
        assert_eq!(file.block_size(), 512);
        assert_eq!(file.prefix(), "x");
        assert_eq!(file.flags(), OpenFlags::READONLY);
    }

    #[test]
    fn serialize_concatenates_in_block_order() {
        let (_, vfs) = vfs_with(4);
        let data: Vec<u8> = (0..50).collect();
        vfs.open("f", OpenFlags::READWRITE).unwrap().write(&data, 0).unwrap();

        assert_eq!(export(&vfs, "f"), data);
    }

    #[test]
    fn serialize_missing_file_is_empty() {
        let (_, vfs) = vfs_with(4);
        assert!(export(&vfs, "nothing").is_empty());
    }

    #[test]
    fn deserialize_overwrites_but_keeps_higher_blocks() {
        let (_, vfs) = vfs_with(4);
        vfs.deserialize("f", &[9u8; 12][..]).unwrap();

        let written = vfs.deserialize("f", &b"abcdef"[..]).unwrap();

        assert_eq!(written, 2);
        let file = vfs.open("f", OpenFlags::READONLY).unwrap();
        assert_eq!(file.file_size().unwrap(), 10);
        assert_eq!(file.read(10, 0).unwrap(), b"abcdef\0\0\x09\x09");
    }

    #[test]
    fn deserialize_after_delete_shrinks() {
        let (_, vfs) = vfs_with(4);
        vfs.deserialize("f", &[9u8; 12][..]).unwrap();

        vfs.delete("f", false).unwrap();
        vfs.deserialize("f", &b"abcdef"[..]).unwrap();

        let file = vfs.open("f", OpenFlags::READONLY).unwrap();
        assert_eq!(file.file_size().unwrap(), 6);
    }

    #[test]
    fn deserialize_chunks_ignores_chunk_sizes() {
        let (store, vfs) = vfs_with(4);
        let chunks = vec![b"a".to_vec(), b"bcdefg".to_vec(), Vec::new(), b"hij".to_vec()];

        assert_eq!(vfs.deserialize_chunks("f", chunks).unwrap(), 3);
        assert_eq!(store.get("f/0000000001").unwrap().unwrap(), b"efgh");
        assert_eq!(export(&vfs, "f"), b"abcdefghij");
    }

    #[test]
    fn copy_replaces_destination() {
        let (_, vfs) = vfs_with(4);
        vfs.deserialize("src", &b"hello world"[..]).unwrap();
        vfs.deserialize("dst", &[7u8; 40][..]).unwrap();

        assert_eq!(vfs.copy("src", "dst").unwrap(), 3);
        assert_eq!(export(&vfs, "dst"), b"hello world");
        assert_eq!(vfs.copy("src", "src").unwrap(), 3);
        assert_eq!(export(&vfs, "src"), b"hello world");
    }

    #[test]
    fn copy_refuses_to_replace_an_ancestor() {
        let (_, vfs) = vfs_with(4);
        vfs.deserialize("a/b", &b"nested data"[..]).unwrap();

        let result = vfs.copy("a/b", "a");

        assert!(matches!(result, Err(VfsError::CopyIntoAncestor { .. })));
        assert_eq!(export(&vfs, "a/b"), b"nested data");
    }

    #[test]
    fn copy_into_descendant() {
        let (_, vfs) = vfs_with(4);
        vfs.deserialize("a", &b"outer"[..]).unwrap();

        vfs.copy("a", "a/b").unwrap();

        assert_eq!(export(&vfs, "a/b"), b"outer");
        assert_eq!(export(&vfs, "a"), b"outer");
    }

    #[test]
    fn name_and_debug() {
        let store = Arc::new(InMemoryObjectStore::new());
        let vfs = BlockVfs::new(store, Config::new().name("s3vfs")).unwrap();
        assert_eq!(vfs.name(), "s3vfs");
        assert!(format!("{vfs:?}").contains("s3vfs"));
    }
}
