//! Attribute and directory-entry types returned to the transport layer.

use std::time::SystemTime;

/// Permission bits for directories: traversable and listable, never
/// writable.
pub const DIR_PERM: u32 = 0o555;

/// Permission bits for field files: readable, never writable.
pub const FILE_PERM: u32 = 0o444;

/// Reported size of every directory. Directory sizes carry no information
/// in this tree.
pub const DIR_SIZE: u64 = 0;

/// Entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// File attributes synthesized from a resolved locator.
///
/// The database carries no timestamp metadata, so every entry reports the
/// process start time for all timestamps.
#[derive(Debug, Clone)]
pub struct FileAttr {
    /// Size in bytes. For field files this is the byte length of the
    /// fetched value; directories report [`DIR_SIZE`].
    pub size: u64,
    /// Entry kind.
    pub kind: FileType,
    /// Unix permission bits.
    pub perm: u32,
    /// Number of hard links.
    pub nlink: u32,
    /// Modification time (also used for access and change times).
    pub mtime: SystemTime,
}

impl FileAttr {
    /// Attributes for a directory entry.
    pub fn directory(mtime: SystemTime) -> Self {
        Self {
            size: DIR_SIZE,
            kind: FileType::Directory,
            perm: DIR_PERM,
            nlink: 2,
            mtime,
        }
    }

    /// Attributes for a field file of `size` bytes.
    pub fn file(size: u64, mtime: SystemTime) -> Self {
        Self {
            size,
            kind: FileType::File,
            perm: FILE_PERM,
            nlink: 1,
            mtime,
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (one path segment, not a full path).
    pub name: String,
    /// Entry kind.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileType::File,
        }
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileType::Directory,
        }
    }
}
