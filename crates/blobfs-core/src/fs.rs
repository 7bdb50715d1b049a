//! The read-only filesystem surface over a resolved database.
//!
//! `BlobFs` is a stateless mapping from (operation, path, byte range) to
//! queries: every call re-resolves its path and re-derives whatever it
//! needs. The only state held across calls is the open connection and the
//! process start time used for timestamps.

use std::time::SystemTime;

use crate::db::Db;
use crate::error::{BlobFsError, BlobFsResult};
use crate::resolve::{self, Locator};
use crate::types::{DirEntry, FileAttr};

/// A SQLite database exposed as a three-level directory tree.
pub struct BlobFs {
    db: Db,
    mount_time: SystemTime,
}

impl BlobFs {
    /// Wrap an open database.
    pub fn new(db: Db) -> Self {
        Self {
            db,
            mount_time: SystemTime::now(),
        }
    }

    /// Get attributes for a path.
    ///
    /// A field file's size is the byte length of its value, so this runs
    /// the field query even though no content was asked for.
    pub fn getattr(&self, path: &str) -> BlobFsResult<FileAttr> {
        match resolve::resolve(&self.db, path)? {
            Locator::Field {
                schema,
                key,
                column,
            } => {
                let value = self.db.fetch_field(&schema, &key, &column)?;
                Ok(FileAttr::file(value.len() as u64, self.mount_time))
            }
            _ => Ok(FileAttr::directory(self.mount_time)),
        }
    }

    /// List a directory.
    ///
    /// Root lists tables (only those with a primary key), a table lists
    /// its encoded row keys, a row lists its column names. The listing is
    /// one complete eagerly-built sequence; there is no paging.
    pub fn readdir(&self, path: &str) -> BlobFsResult<Vec<DirEntry>> {
        match resolve::resolve(&self.db, path)? {
            Locator::Root => {
                let mut entries = Vec::new();
                for table in self.db.list_tables()? {
                    // A table dropped between the two catalog queries just
                    // vanishes from the listing.
                    match self.db.table_schema(&table) {
                        Ok(schema) if schema.key_arity() > 0 => {
                            entries.push(DirEntry::directory(table));
                        }
                        Ok(_) | Err(BlobFsError::NotFound(_)) => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(entries)
            }
            Locator::Table { schema } => Ok(self
                .db
                .list_keys(&schema)?
                .into_iter()
                .map(DirEntry::directory)
                .collect()),
            Locator::Row { schema, .. } => Ok(schema
                .columns
                .iter()
                .map(|c| DirEntry::file(&c.name))
                .collect()),
            Locator::Field { .. } => Err(BlobFsError::not_a_directory(path)),
        }
    }

    /// Validate that a path can be opened for reading.
    ///
    /// No handle state is created; a later read re-resolves from scratch.
    pub fn open(&self, path: &str) -> BlobFsResult<()> {
        match resolve::resolve(&self.db, path)? {
            Locator::Field { .. } => Ok(()),
            _ => Err(BlobFsError::is_a_directory(path)),
        }
    }

    /// Read a byte range of a field file.
    ///
    /// The value is re-fetched in full on every call and the requested
    /// range is clamped to its length.
    pub fn read(&self, path: &str, offset: u64, size: u32) -> BlobFsResult<Vec<u8>> {
        match resolve::resolve(&self.db, path)? {
            Locator::Field {
                schema,
                key,
                column,
            } => {
                let value = self.db.fetch_field(&schema, &key, &column)?;
                let start = (offset as usize).min(value.len());
                let end = start.saturating_add(size as usize).min(value.len());
                Ok(value[start..end].to_vec())
            }
            _ => Err(BlobFsError::is_a_directory(path)),
        }
    }

    /// Always true: the tree never accepts writes.
    pub fn read_only(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdb::scratch;
    use crate::types::FileType;

    fn fixture() -> (tempfile::NamedTempFile, BlobFs) {
        let (file, db) = scratch(
            "CREATE TABLE repository (
                 owner TEXT,
                 name TEXT,
                 stars INTEGER,
                 PRIMARY KEY (owner, name)
             );
             INSERT INTO repository VALUES ('alice', 'widgets', 7);
             INSERT INTO repository VALUES ('bob', 'gears', 0);
             CREATE TABLE log (line TEXT);",
        );
        (file, BlobFs::new(db))
    }

    #[test]
    fn test_getattr_directories() {
        let (_file, fs) = fixture();
        assert!(fs.getattr("/").unwrap().is_dir());
        assert!(fs.getattr("/repository").unwrap().is_dir());
        assert!(fs.getattr("/repository/alice,widgets").unwrap().is_dir());
    }

    #[test]
    fn test_getattr_field_reports_value_length() {
        let (_file, fs) = fixture();
        let attr = fs.getattr("/repository/alice,widgets/owner").unwrap();
        assert!(attr.is_file());
        assert_eq!(attr.size, 5);
    }

    #[test]
    fn test_getattr_unknown_path() {
        let (_file, fs) = fixture();
        assert!(matches!(
            fs.getattr("/repository/zed,zed"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_readdir_root_excludes_keyless_tables() {
        let (_file, fs) = fixture();
        let names: Vec<String> = fs
            .readdir("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["repository"]);
    }

    #[test]
    fn test_readdir_table_lists_encoded_keys() {
        let (_file, fs) = fixture();
        let mut names: Vec<String> = fs
            .readdir("/repository")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["alice,widgets", "bob,gears"]);
    }

    #[test]
    fn test_readdir_row_lists_columns_as_files() {
        let (_file, fs) = fixture();
        let entries = fs.readdir("/repository/alice,widgets").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["owner", "name", "stars"]);
        assert!(entries.iter().all(|e| e.kind == FileType::File));
    }

    #[test]
    fn test_readdir_field_is_not_a_directory() {
        let (_file, fs) = fixture();
        assert!(matches!(
            fs.readdir("/repository/alice,widgets/stars"),
            Err(BlobFsError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_open_field_only() {
        let (_file, fs) = fixture();
        fs.open("/repository/alice,widgets/stars").unwrap();
        assert!(matches!(
            fs.open("/repository"),
            Err(BlobFsError::IsADirectory(_))
        ));
        assert!(matches!(
            fs.open("/repository/alice,widgets/nope"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_read_clamps_range() {
        let (_file, fs) = fixture();
        let path = "/repository/alice,widgets/owner";
        assert_eq!(fs.read(path, 0, 1024).unwrap(), b"alice");
        assert_eq!(fs.read(path, 2, 2).unwrap(), b"ic");
        assert_eq!(fs.read(path, 5, 10).unwrap(), b"");
        assert_eq!(fs.read(path, 100, 10).unwrap(), b"");
    }

    #[test]
    fn test_read_directory_fails() {
        let (_file, fs) = fixture();
        assert!(matches!(
            fs.read("/repository", 0, 10),
            Err(BlobFsError::IsADirectory(_))
        ));
    }

    #[test]
    fn test_read_only() {
        let (_file, fs) = fixture();
        assert!(fs.read_only());
    }
}
