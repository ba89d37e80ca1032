//! Cross-crate integration test helpers.
//!
//! Provides a harness that drives a virtual file and a [`ShadowFile`] in
//! lockstep, plus integration tests that look at the store traffic the
//! core produces.

use crate::generators::FileOp;
use crate::model::ShadowFile;
use blockvfs_core::{BlockVfs, Config, OpenFlags, Vfs, VfsFile, VirtualFile};
use blockvfs_store::{InMemoryObjectStore, ObjectStore};
use std::sync::Arc;

/// A test harness that checks a virtual file against its model.
pub struct IntegrationHarness {
    /// The filesystem.
    pub vfs: BlockVfs,
    /// The file under test.
    pub file: VirtualFile,
    model: ShadowFile,
}

impl IntegrationHarness {
    /// Creates a harness over a fresh in-memory bucket.
    pub fn new(block_size: usize) -> Self {
        Self::over(Arc::new(InMemoryObjectStore::new()), block_size)
    }

    /// Creates a harness over `store`, using the file `harness.db`.
    pub fn over(store: Arc<dyn ObjectStore>, block_size: usize) -> Self {
        let vfs = BlockVfs::new(store, Config::new().block_size(block_size))
            .expect("Failed to create filesystem");
        let file = vfs
            .open("harness.db", OpenFlags::READWRITE | OpenFlags::CREATE)
            .expect("Failed to open file");
        Self {
            vfs,
            file,
            model: ShadowFile::new(),
        }
    }

    /// Writes to both the file and the model.
    pub fn write(&mut self, data: &[u8], offset: u64) {
        self.file.write(data, offset).expect("Failed to write");
        self.model.write(data, offset);
    }

    /// Truncates both the file and the model.
    pub fn truncate(&mut self, new_size: u64) {
        self.file.truncate(new_size).expect("Failed to truncate");
        self.model.truncate(new_size);
    }

    /// Applies a generated operation, resolving its relative position.
    pub fn apply(&mut self, op: &FileOp) {
        let len = self.model.len();
        match op {
            FileOp::Write { position, data } => self.write(data, FileOp::resolve(*position, len)),
            FileOp::Truncate { position } => self.truncate(FileOp::resolve(*position, len)),
        }
    }

    /// Reads a range and verifies it matches the model.
    pub fn read_and_verify(&self, amount: usize, offset: u64) -> Vec<u8> {
        let actual = self.file.read(amount, offset).expect("Failed to read");
        assert_eq!(
            actual,
            self.model.read(amount, offset),
            "read mismatch at offset {offset}, amount {amount}"
        );
        actual
    }

    /// Verifies size, full content, and export stream against the model.
    pub fn verify_all(&self) {
        let size = self.file.file_size().expect("Failed to size");
        assert_eq!(size, self.model.len(), "size mismatch");
        self.read_and_verify(self.model.len() as usize + 1, 0);

        let mut exported = Vec::new();
        let mut reader = self.vfs.serialize("harness.db").expect("Failed to serialize");
        std::io::copy(&mut reader, &mut exported).expect("Failed to stream");
        assert_eq!(exported, self.model.as_bytes(), "export mismatch");
    }

    /// The model the file is checked against.
    pub fn model(&self) -> &ShadowFile {
        &self.model
    }
}
