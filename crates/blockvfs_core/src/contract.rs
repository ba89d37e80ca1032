//! The storage plugin contract a host database engine drives.
//!
//! The engine never reaches into BlockVFS internals. It calls the filesystem
//! level operations in [`Vfs`] to resolve and open files, then performs page
//! I/O through the returned [`VfsFile`]. Flag values follow the numeric
//! conventions of SQLite's VFS layer so an FFI shim can pass them straight
//! through.

use crate::error::VfsResult;
use std::ops::BitOr;

/// What an existence check asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFlags {
    /// Does the file exist at all?
    Exists,
    /// Is the file readable and writable?
    ReadWrite,
    /// Is the file readable?
    Read,
}

impl AccessFlags {
    /// Converts the engine's numeric access code.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Exists),
            1 => Some(Self::ReadWrite),
            2 => Some(Self::Read),
            _ => None,
        }
    }
}

/// Bit set passed to [`Vfs::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct OpenFlags(u32);

impl OpenFlags {
    /// Open for reading only.
    pub const READONLY: Self = Self(0x0000_0001);
    /// Open for reading and writing.
    pub const READWRITE: Self = Self(0x0000_0002);
    /// Create the file if missing.
    pub const CREATE: Self = Self(0x0000_0004);
    /// Delete the file when closed.
    pub const DELETE_ON_CLOSE: Self = Self(0x0000_0008);
    /// Fail if the file already exists.
    pub const EXCLUSIVE: Self = Self(0x0000_0010);
    /// Main database file.
    pub const MAIN_DB: Self = Self(0x0000_0100);
    /// Temporary database file.
    pub const TEMP_DB: Self = Self(0x0000_0200);
    /// Transient database file.
    pub const TRANSIENT_DB: Self = Self(0x0000_0400);
    /// Rollback journal of the main database.
    pub const MAIN_JOURNAL: Self = Self(0x0000_0800);
    /// Rollback journal of a temporary database.
    pub const TEMP_JOURNAL: Self = Self(0x0000_1000);
    /// Statement journal.
    pub const SUBJOURNAL: Self = Self(0x0000_2000);
    /// Super-journal of a multi-database transaction.
    pub const SUPER_JOURNAL: Self = Self(0x0000_4000);
    /// Write-ahead log.
    pub const WAL: Self = Self(0x0008_0000);

    /// Builds a flag set from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for OpenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Bit set passed to [`VfsFile::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncFlags(u32);

impl SyncFlags {
    /// Ordinary sync.
    pub const NORMAL: Self = Self(0x0000_0002);
    /// Full sync.
    pub const FULL: Self = Self(0x0000_0003);
    /// Only file content needs to be durable.
    pub const DATAONLY: Self = Self(0x0000_0010);

    /// Builds a flag set from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// File lock levels of the engine's locking protocol, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LockLevel {
    /// No lock held.
    #[default]
    None,
    /// Reading.
    Shared,
    /// Planning to write.
    Reserved,
    /// Waiting for readers to drain.
    Pending,
    /// Writing.
    Exclusive,
}

/// Filesystem-level half of the plugin contract.
pub trait Vfs {
    /// The file type returned by [`Vfs::open`].
    type File: VfsFile;

    /// Answers an access check for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be queried.
    fn exists(&self, name: &str, access: AccessFlags) -> VfsResult<bool>;

    /// Resolves `name` to the canonical name used for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be resolved.
    fn full_path(&self, name: &str) -> VfsResult<String>;

    /// Deletes the file `name`. Deleting a missing file succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn delete(&self, name: &str, sync_dir: bool) -> VfsResult<()>;

    /// Opens the file `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn open(&self, name: &str, flags: OpenFlags) -> VfsResult<Self::File>;
}

/// File-level half of the plugin contract.
pub trait VfsFile {
    /// Reads exactly `amount` bytes starting at `offset`. Bytes never written
    /// read as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn read(&self, amount: usize, offset: u64) -> VfsResult<Vec<u8>>;

    /// Writes `data` at `offset`, growing the file as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails. Earlier blocks of a
    /// multi-block write may already be committed.
    fn write(&mut self, data: &[u8], offset: u64) -> VfsResult<()>;

    /// Shrinks the file to `new_size` bytes. Growing is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn truncate(&mut self, new_size: u64) -> VfsResult<()>;

    /// Returns the current file size.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn file_size(&self) -> VfsResult<u64>;

    /// Makes earlier writes durable.
    ///
    /// # Errors
    ///
    /// Returns an error if durability cannot be guaranteed.
    fn sync(&mut self, flags: SyncFlags) -> VfsResult<()>;

    /// Acquires a lock of at least `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    fn lock(&mut self, level: LockLevel) -> VfsResult<()>;

    /// Drops the lock down to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be released.
    fn unlock(&mut self, level: LockLevel) -> VfsResult<()>;

    /// Returns true if any connection holds a reserved lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock state cannot be queried.
    fn check_reserved_lock(&self) -> VfsResult<bool>;

    /// Handles an engine-specific control opcode. Returns false if the
    /// opcode is not understood.
    ///
    /// # Errors
    ///
    /// Returns an error if the opcode is understood but fails.
    fn file_control(&mut self, op: i32) -> VfsResult<bool>;

    /// Smallest write unit the storage can perform atomically.
    fn sector_size(&self) -> usize;

    /// Device capability bits. Zero claims nothing.
    fn device_characteristics(&self) -> u32;

    /// Closes the file.
    ///
    /// # Errors
    ///
    /// Returns an error if resources cannot be released.
    fn close(&mut self) -> VfsResult<()>;
}
