//! Error types for the blobfs core.

use std::io;
use thiserror::Error;

/// Error type shared by path resolution, query execution, and the
/// filesystem operations built on top of them.
#[derive(Debug, Error)]
pub enum BlobFsError {
    /// Unknown table, row, or column segment.
    #[error("not found: {0}")]
    NotFound(String),

    /// A file locator was used where a directory is required.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A directory locator was used where a file is required.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// A key segment does not decode to the table's primary-key arity.
    #[error("invalid key segment `{segment}`: expected {expected} component(s), got {actual}")]
    InvalidKey {
        segment: String,
        expected: usize,
        actual: usize,
    },

    /// The filesystem is read-only.
    #[error("filesystem is read-only")]
    ReadOnly,

    /// Underlying database failure, including malformed-identifier faults.
    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl BlobFsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }
}

/// Convert BlobFsError to std::io::Error for compatibility.
impl From<BlobFsError> for io::Error {
    fn from(e: BlobFsError) -> Self {
        match e {
            BlobFsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            BlobFsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            BlobFsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            BlobFsError::InvalidKey { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
            }
            BlobFsError::ReadOnly => {
                io::Error::new(io::ErrorKind::PermissionDenied, "filesystem is read-only")
            }
            BlobFsError::Store(e) => io::Error::other(e.to_string()),
        }
    }
}

/// Result type for blobfs core operations.
pub type BlobFsResult<T> = Result<T, BlobFsError>;
