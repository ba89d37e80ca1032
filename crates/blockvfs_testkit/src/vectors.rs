//! Block layout test vectors.
//!
//! Each vector is a short write/truncate script and the block objects it
//! must leave behind. Any implementation sharing a bucket with BlockVFS must
//! produce the same layout, so the vectors are also exported as JSON.

use blockvfs_core::{BlockVfs, Config, OpenFlags, Vfs, VfsFile, VfsResult};
use blockvfs_store::{InMemoryObjectStore, ObjectStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One step of a layout script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayoutStep {
    /// Writes `len` copies of `byte` at `offset`.
    Write {
        /// Byte offset.
        offset: u64,
        /// Number of bytes.
        len: usize,
        /// Fill byte.
        byte: u8,
    },
    /// Truncates to `size`.
    Truncate {
        /// New size.
        size: u64,
    },
}

/// A layout test vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Block size in bytes.
    pub block_size: usize,
    /// Steps applied to an empty file named `f`.
    pub steps: Vec<LayoutStep>,
    /// Expected `(key, size)` of every object afterwards, ascending.
    pub expected_objects: Vec<(String, u64)>,
    /// Expected file size afterwards.
    pub expected_size: u64,
}

fn write(offset: u64, len: usize, byte: u8) -> LayoutStep {
    LayoutStep::Write { offset, len, byte }
}

fn objects(sizes: &[(u64, u64)]) -> Vec<(String, u64)> {
    sizes
        .iter()
        .map(|&(index, size)| (blockvfs_core::block_key("f", index), size))
        .collect()
}

/// The built-in layout vectors.
pub fn layout_vectors() -> Vec<LayoutVector> {
    vec![
        LayoutVector {
            id: "two_blocks".into(),
            description: "5000 bytes at offset 0 with 4096-byte blocks".into(),
            block_size: 4096,
            steps: vec![write(0, 5000, 1)],
            expected_objects: objects(&[(0, 4096), (1, 904)]),
            expected_size: 5000,
        },
        LayoutVector {
            id: "exact_block".into(),
            description: "one aligned full block".into(),
            block_size: 4096,
            steps: vec![write(0, 4096, 1)],
            expected_objects: objects(&[(0, 4096)]),
            expected_size: 4096,
        },
        LayoutVector {
            id: "sparse_tail".into(),
            description: "a write past the end creates only the touched block".into(),
            block_size: 16,
            steps: vec![write(40, 4, 1)],
            expected_objects: objects(&[(2, 12)]),
            expected_size: 12,
        },
        LayoutVector {
            id: "append_pages".into(),
            description: "1024-byte pages appended into 4096-byte blocks".into(),
            block_size: 4096,
            steps: (0..6).map(|i| write(i * 1024, 1024, i as u8)).collect(),
            expected_objects: objects(&[(0, 4096), (1, 2048)]),
            expected_size: 6144,
        },
        LayoutVector {
            id: "truncate_mid_block".into(),
            description: "truncate inside the second block".into(),
            block_size: 100,
            steps: vec![write(0, 350, 1), LayoutStep::Truncate { size: 150 }],
            expected_objects: objects(&[(0, 100), (1, 50)]),
            expected_size: 150,
        },
        LayoutVector {
            id: "truncate_grow".into(),
            description: "truncating to a larger size changes nothing".into(),
            block_size: 100,
            steps: vec![write(0, 150, 1), LayoutStep::Truncate { size: 1000 }],
            expected_objects: objects(&[(0, 100), (1, 50)]),
            expected_size: 150,
        },
        LayoutVector {
            id: "truncate_then_extend".into(),
            description: "extend after truncating to zero".into(),
            block_size: 100,
            steps: vec![
                write(0, 300, 1),
                LayoutStep::Truncate { size: 0 },
                write(0, 120, 2),
            ],
            expected_objects: objects(&[(0, 100), (1, 20)]),
            expected_size: 120,
        },
    ]
}

/// Serializes the built-in vectors as pretty JSON.
pub fn layout_vectors_json() -> String {
    serde_json::to_string_pretty(&layout_vectors()).expect("layout vectors serialize")
}

/// Runs `vector` against a fresh in-memory bucket and returns the resulting
/// objects and file size.
pub fn run_layout_vector(vector: &LayoutVector) -> VfsResult<(Vec<(String, u64)>, u64)> {
    let store = Arc::new(InMemoryObjectStore::new());
    let vfs = BlockVfs::new(store.clone(), Config::new().block_size(vector.block_size))?;
    let mut file = vfs.open("f", OpenFlags::READWRITE | OpenFlags::CREATE)?;

    for step in &vector.steps {
        match *step {
            LayoutStep::Write { offset, len, byte } => file.write(&vec![byte; len], offset)?,
            LayoutStep::Truncate { size } => file.truncate(size)?,
        }
    }

    let listed = store
        .list("")?
        .into_iter()
        .map(|meta| (meta.key, meta.size))
        .collect();
    Ok((listed, file.file_size()?))
}
