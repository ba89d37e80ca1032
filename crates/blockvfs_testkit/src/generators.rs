//! Property-based test generators using proptest.
//!
//! Provides strategies for generating block sizes, payloads, and sequences
//! of file operations shaped like an engine's I/O.

use proptest::prelude::*;

/// One operation against a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    /// Writes `data` at a position chosen relative to the current length.
    ///
    /// `position` is in thousandths of the current length, so `1000` appends
    /// and `0` overwrites the start. Positions never leave a hole, matching
    /// an engine that extends files page by page.
    Write {
        /// Position in thousandths of the current file length.
        position: u16,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// Truncates to a size chosen relative to the current length.
    Truncate {
        /// New size in thousandths of the current file length.
        position: u16,
    },
}

impl FileOp {
    /// Resolves a relative position against `len`.
    pub fn resolve(position: u16, len: u64) -> u64 {
        len * u64::from(position.min(1000)) / 1000
    }
}

/// Strategy for block sizes, from pathological to realistic.
pub fn block_size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![
        1 => Just(1usize),
        2 => 2usize..64,
        2 => prop::sample::select(vec![512usize, 1024, 4096]),
    ]
}

/// Strategy for write payloads.
pub fn payload_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len.max(1))
}

/// Strategy for a single file operation.
pub fn file_op_strategy(max_len: usize) -> impl Strategy<Value = FileOp> {
    prop_oneof![
        4 => (0u16..=1000, payload_strategy(max_len))
            .prop_map(|(position, data)| FileOp::Write { position, data }),
        1 => (0u16..=1000).prop_map(|position| FileOp::Truncate { position }),
    ]
}

/// Strategy for a sequence of file operations.
pub fn file_ops_strategy(max_ops: usize, max_len: usize) -> impl Strategy<Value = Vec<FileOp>> {
    prop::collection::vec(file_op_strategy(max_len), 1..=max_ops.max(1))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
