//! Byte-level model of a logical file.
//!
//! Tests apply the same operations to a [`ShadowFile`] and to a real virtual
//! file, then compare reads.

/// The expected content of a file, held as one contiguous buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowFile {
    bytes: Vec<u8>,
}

impl ShadowFile {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes `data` at `offset`, zero-filling any gap.
    pub fn write(&mut self, data: &[u8], offset: u64) {
        let start = offset as usize;
        let end = start + data.len();
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(data);
    }

    /// Shrinks to `new_size`; growing is ignored.
    pub fn truncate(&mut self, new_size: u64) {
        self.bytes.truncate(new_size as usize);
    }

    /// Reads `amount` bytes at `offset`, zero past the end.
    pub fn read(&self, amount: usize, offset: u64) -> Vec<u8> {
        let start = (offset as usize).min(self.bytes.len());
        let end = (offset as usize + amount).min(self.bytes.len());
        let mut out = self.bytes[start..end].to_vec();
        out.resize(amount, 0);
        out
    }

    /// The whole content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
