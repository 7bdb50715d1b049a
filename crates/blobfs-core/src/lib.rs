//! Path resolution and query translation for blobfs.
//!
//! blobfs exposes the rows and columns of a SQLite database as a read-only
//! three-level directory tree: `/<table>/<key>/<column>`. This crate is the
//! engine behind the mount; the FUSE transport lives in `blobfs-fuse`.
//!
//! Key components:
//!
//! - [`Db`] - the single database connection plus all catalog and data
//!   queries
//! - [`keys`] - encodes a primary-key tuple into one path segment and back
//! - [`Locator`] / [`resolve`](resolve::resolve) - classifies a path as
//!   root, table directory, row directory, or field file
//! - [`BlobFs`] - the path-based operation surface (getattr, readdir,
//!   open, read)
//!
//! ## Design Decisions
//!
//! - **No caching**: schema and data are re-queried on every call, so the
//!   tree always reflects the current database state.
//! - **Path-based, no inodes**: the transport layer handles inode ↔ path
//!   mapping; everything here works on path strings.
//! - **Read-only**: there is no write path anywhere in the crate, and the
//!   connection itself is opened without write flags.

pub mod db;
pub mod error;
pub mod fs;
pub mod keys;
pub mod resolve;
pub mod schema;
pub mod types;

pub use db::Db;
pub use error::{BlobFsError, BlobFsResult};
pub use fs::BlobFs;
pub use resolve::Locator;
pub use schema::{Affinity, ColumnSchema, TableSchema};
pub use types::{DirEntry, FileAttr, FileType};

/// Scratch databases for unit tests.
#[cfg(test)]
pub(crate) mod testdb {
    use tempfile::NamedTempFile;

    use crate::db::Db;

    /// Create a temp-file database from DDL and reopen it read-only.
    pub fn scratch(sql: &str) -> (NamedTempFile, Db) {
        let file = NamedTempFile::new().unwrap();
        let conn = rusqlite::Connection::open(file.path()).unwrap();
        conn.execute_batch(sql).unwrap();
        drop(conn);
        let db = Db::open(file.path()).unwrap();
        (file, db)
    }
}
