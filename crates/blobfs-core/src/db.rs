//! SQLite access for the filesystem tree.
//!
//! One `Db` owns the single connection for the whole mount lifetime. Every
//! method re-queries the live database; nothing is memoized, so schema and
//! data changes made by other writers are visible on the next call.
//!
//! Key values are always bound as parameters. Table and column names are
//! interpolated into the statement text; they originate from the database's
//! own catalog by the time a data query runs, and a malformed name faults
//! the statement into [`BlobFsError::Store`]. See DESIGN.md.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params, params_from_iter};
use std::path::Path;

use crate::error::{BlobFsError, BlobFsResult};
use crate::keys;
use crate::schema::{Affinity, ColumnSchema, TableSchema};

/// Handle to the database backing the mounted tree.
pub struct Db {
    conn: Connection,
}

impl Db {
    /// Open an existing database read-only.
    ///
    /// The tree never writes, so the connection is opened without write or
    /// create flags; a missing or unreadable file is an error here rather
    /// than at first query.
    pub fn open<P: AsRef<Path>>(path: P) -> BlobFsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    // =========================================================================
    // Schema introspection
    // =========================================================================

    /// List all tables in the database, name-ordered.
    pub fn list_tables(&self) -> BlobFsResult<Vec<String>> {
        let sql = "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name";
        tracing::debug!(sql, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Returns true if `name` is a table in the database.
    pub fn table_exists(&self, name: &str) -> BlobFsResult<bool> {
        let sql = "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1";
        tracing::debug!(sql, table = name, "query");
        let mut stmt = self.conn.prepare(sql)?;
        Ok(stmt.exists(params![name])?)
    }

    /// Describe a table's columns and primary-key composition.
    ///
    /// Fails with [`BlobFsError::NotFound`] when the table does not exist
    /// (the pragma yields no columns for unknown names).
    pub fn table_schema(&self, name: &str) -> BlobFsResult<TableSchema> {
        let sql = "SELECT name, type, pk FROM pragma_table_info(?1)";
        tracing::debug!(sql, table = name, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![name], |row| {
            let decl: String = row.get(1)?;
            let pk: u32 = row.get(2)?;
            Ok(ColumnSchema {
                name: row.get(0)?,
                affinity: Affinity::from_declared(&decl),
                pk_ordinal: (pk > 0).then_some(pk),
            })
        })?;
        let columns = rows.collect::<Result<Vec<_>, _>>()?;
        if columns.is_empty() {
            return Err(BlobFsError::not_found(name));
        }
        Ok(TableSchema {
            name: name.to_owned(),
            columns,
        })
    }

    // =========================================================================
    // Keys and rows
    // =========================================================================

    /// List the encoded primary keys of every row in `table`.
    ///
    /// The whole result set is materialized before returning; a very large
    /// table pays the full cost here in one blocking pass.
    pub fn list_keys(&self, table: &TableSchema) -> BlobFsResult<Vec<String>> {
        let pk = table.primary_key();
        let cols: Vec<&str> = pk.iter().map(|c| c.name.as_str()).collect();
        let sql = format!("SELECT {} FROM {}", cols.join(", "), table.name);
        tracing::debug!(sql = %sql, "query");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let mut components = Vec::with_capacity(cols.len());
            for i in 0..cols.len() {
                components.push(value_text(row.get_ref(i)?));
            }
            Ok(keys::encode(&components))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Returns true if `table` holds a row with the given key components.
    pub fn row_exists(&self, table: &TableSchema, key: &[String]) -> BlobFsResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} LIMIT 1",
            table.name,
            key_predicate(table)
        );
        tracing::debug!(sql = %sql, key = ?key, "query");
        let mut stmt = self.conn.prepare(&sql)?;
        Ok(stmt.exists(params_from_iter(key))?)
    }

    // =========================================================================
    // Field values
    // =========================================================================

    /// Fetch one column of one row as raw file bytes.
    ///
    /// Blob values are returned verbatim; every other storage class is
    /// rendered as UTF-8 text with no trailing terminator. Fails with
    /// [`BlobFsError::NotFound`] when no row matches the key, which can
    /// happen when the row vanished after path resolution.
    pub fn fetch_field(
        &self,
        table: &TableSchema,
        key: &[String],
        column: &str,
    ) -> BlobFsResult<Vec<u8>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} LIMIT 1",
            column,
            table.name,
            key_predicate(table)
        );
        tracing::debug!(sql = %sql, key = ?key, "query");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(key))?;
        match rows.next()? {
            Some(row) => Ok(value_bytes(row.get_ref(0)?)),
            None => Err(BlobFsError::not_found(format!(
                "{}/{}/{}",
                table.name,
                keys::encode(key),
                column
            ))),
        }
    }
}

/// `pk1 = ?1 AND pk2 = ?2 AND ...` over the table's key columns.
fn key_predicate(table: &TableSchema) -> String {
    table
        .primary_key()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c.name, i + 1))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Render a value as file content bytes.
fn value_bytes(value: ValueRef<'_>) -> Vec<u8> {
    match value {
        ValueRef::Null => Vec::new(),
        ValueRef::Integer(i) => i.to_string().into_bytes(),
        ValueRef::Real(r) => r.to_string().into_bytes(),
        ValueRef::Text(t) => t.to_vec(),
        ValueRef::Blob(b) => b.to_vec(),
    }
}

/// Render a value as a key component string.
fn value_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => r.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
