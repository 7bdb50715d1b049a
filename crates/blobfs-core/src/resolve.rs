//! Path resolution: from a path string to a semantic locator.
//!
//! A path has at most three meaningful segments, `/<table>/<key>/<column>`.
//! Each segment is validated against the live schema and data as resolution
//! descends; nothing is cached, so the same path can resolve differently
//! across calls when the database changes underneath.

use crate::db::Db;
use crate::error::{BlobFsError, BlobFsResult};
use crate::keys;
use crate::schema::TableSchema;

/// The resolved meaning of a filesystem path.
#[derive(Debug, Clone)]
pub enum Locator {
    /// The mount root; lists one directory per table.
    Root,
    /// A table directory; lists one directory per row key.
    Table { schema: TableSchema },
    /// A row directory; lists one file per column.
    Row {
        schema: TableSchema,
        key: Vec<String>,
    },
    /// A column of a single row, exposed as a regular file.
    Field {
        schema: TableSchema,
        key: Vec<String>,
        column: String,
    },
}

impl Locator {
    /// Returns true for the directory variants.
    pub fn is_dir(&self) -> bool {
        !matches!(self, Locator::Field { .. })
    }
}

/// Resolve a path into a [`Locator`], validating every segment.
pub fn resolve(db: &Db, path: &str) -> BlobFsResult<Locator> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => Ok(Locator::Root),
        [table] => {
            let schema = resolve_table(db, table)?;
            Ok(Locator::Table { schema })
        }
        [table, key] => {
            let (schema, key) = resolve_row(db, table, key)?;
            Ok(Locator::Row { schema, key })
        }
        [table, key, column] => {
            let (schema, key) = resolve_row(db, table, key)?;
            if schema.column(column).is_none() {
                return Err(BlobFsError::not_found(path));
            }
            Ok(Locator::Field {
                schema,
                key,
                column: (*column).to_owned(),
            })
        }
        // No hierarchy exists below the column level.
        _ => Err(BlobFsError::not_found(path)),
    }
}

/// Resolve a table segment. Tables without a primary key have no place in
/// the tree and resolve as not found.
fn resolve_table(db: &Db, table: &str) -> BlobFsResult<TableSchema> {
    let schema = db.table_schema(table)?;
    if schema.key_arity() == 0 {
        return Err(BlobFsError::not_found(table));
    }
    Ok(schema)
}

/// Resolve a `<table>/<key>` pair. The table resolves first, then the key
/// segment is decoded against its arity, then the row's existence is
/// checked against live data.
fn resolve_row(db: &Db, table: &str, key: &str) -> BlobFsResult<(TableSchema, Vec<String>)> {
    let schema = resolve_table(db, table)?;
    let components = keys::decode(key, schema.key_arity())?;
    if !db.row_exists(&schema, &components)? {
        return Err(BlobFsError::not_found(format!("{table}/{key}")));
    }
    Ok((schema, components))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdb::scratch;

    fn fixture() -> (tempfile::NamedTempFile, Db) {
        scratch(
            "CREATE TABLE repository (
                 owner TEXT,
                 name TEXT,
                 stars INTEGER,
                 PRIMARY KEY (owner, name)
             );
             INSERT INTO repository VALUES ('alice', 'widgets', 7);
             CREATE TABLE log (line TEXT);",
        )
    }

    #[test]
    fn test_resolve_root() {
        let (_file, db) = fixture();
        assert!(matches!(resolve(&db, "/").unwrap(), Locator::Root));
        assert!(matches!(resolve(&db, "").unwrap(), Locator::Root));
    }

    #[test]
    fn test_resolve_table() {
        let (_file, db) = fixture();
        match resolve(&db, "/repository").unwrap() {
            Locator::Table { schema } => assert_eq!(schema.name, "repository"),
            other => panic!("unexpected locator: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_unknown_table() {
        let (_file, db) = fixture();
        assert!(matches!(
            resolve(&db, "/missing"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_table_without_primary_key() {
        let (_file, db) = fixture();
        assert!(matches!(
            resolve(&db, "/log"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_row() {
        let (_file, db) = fixture();
        match resolve(&db, "/repository/alice,widgets").unwrap() {
            Locator::Row { key, .. } => assert_eq!(key, vec!["alice", "widgets"]),
            other => panic!("unexpected locator: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_row_wrong_arity() {
        let (_file, db) = fixture();
        assert!(matches!(
            resolve(&db, "/repository/alice"),
            Err(BlobFsError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_resolve_missing_row() {
        let (_file, db) = fixture();
        assert!(matches!(
            resolve(&db, "/repository/bob,widgets"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_unknown_table_wins_over_bad_key() {
        // The table segment resolves first, so an unknown table reports
        // NotFound even when the key segment would also be invalid.
        let (_file, db) = fixture();
        assert!(matches!(
            resolve(&db, "/missing/a,b,c"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_field() {
        let (_file, db) = fixture();
        match resolve(&db, "/repository/alice,widgets/stars").unwrap() {
            Locator::Field { column, .. } => assert_eq!(column, "stars"),
            other => panic!("unexpected locator: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_unknown_column() {
        let (_file, db) = fixture();
        assert!(matches!(
            resolve(&db, "/repository/alice,widgets/nope"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_too_deep() {
        let (_file, db) = fixture();
        assert!(matches!(
            resolve(&db, "/repository/alice,widgets/stars/extra"),
            Err(BlobFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_is_dir() {
        let (_file, db) = fixture();
        assert!(resolve(&db, "/").unwrap().is_dir());
        assert!(resolve(&db, "/repository").unwrap().is_dir());
        assert!(resolve(&db, "/repository/alice,widgets").unwrap().is_dir());
        assert!(!resolve(&db, "/repository/alice,widgets/stars").unwrap().is_dir());
    }
}
