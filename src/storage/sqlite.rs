//! SQLite storage implementation.
//!
//! [`MetadataStore`] owns the single connection used for a run. Rows of the
//! `audio` table are handled as raw SQLite values; turning them into tag
//! values is the job of [`crate::sync::value`].

use std::path::Path;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::debug;

use super::columns::{self, quote_identifier, ColumnMap};
use super::schema::{apply_schema, AUDIO_TABLE, PATH_COLUMN};
use crate::error::Result;

/// SQLite-based metadata store.
#[derive(Debug)]
pub struct MetadataStore {
    conn: Connection,
}

/// One row of the `audio` table, cells paired with their column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRow {
    cells: Vec<(String, Value)>,
}

impl MetadataRow {
    /// Raw value of a column, matched case-insensitively.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// Iterate over cells in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl MetadataStore {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an existing database without changing it.
    ///
    /// No pragmas or schema are applied, so the file keeps its journal mode
    /// and gains no bookkeeping tables. Any write fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Introspect the current column set.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be introspected.
    pub fn columns(&self) -> Result<ColumnMap> {
        columns::current_columns(&self.conn)
    }

    /// Add any missing tag columns and return the refreshed column set.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is rejected; no column is added then.
    pub fn ensure_columns(&mut self, names: &[&str]) -> Result<ColumnMap> {
        columns::ensure_columns(&mut self.conn, names)
    }

    /// Replace the row for `path` with exactly the given cells.
    ///
    /// The old row is deleted and the new one inserted in one transaction,
    /// so columns missing from `cells` end up NULL. `cells` must include the
    /// path column; every column named must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if either statement fails; the old row is kept then.
    pub fn replace_row(&mut self, path: &Value, cells: &[(&str, Value)]) -> Result<()> {
        let names: Vec<String> = cells.iter().map(|(name, _)| quote_identifier(name)).collect();
        let placeholders: Vec<String> = (1..=cells.len()).map(|i| format!("?{i}")).collect();
        let insert = format!(
            "INSERT INTO {AUDIO_TABLE} ({}) VALUES ({})",
            names.join(", "),
            placeholders.join(", ")
        );
        debug!(sql = %insert, "Replacing row");

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DELETE FROM {AUDIO_TABLE} WHERE {PATH_COLUMN} = ?1"),
            [path],
        )?;
        tx.execute(&insert, params_from_iter(cells.iter().map(|(_, value)| value)))?;
        tx.commit()?;
        Ok(())
    }

    /// Read every row of the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn rows(&self) -> Result<Vec<MetadataRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {AUDIO_TABLE} ORDER BY rowid"))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt
            .query_map([], |row| {
                let cells = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Ok((name.clone(), row.get::<_, Value>(i)?)))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(MetadataRow { cells })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Read the row stored for a path key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn row(&self, path: &Value) -> Result<Option<MetadataRow>> {
        Ok(self
            .rows()?
            .into_iter()
            .find(|row| row.get(PATH_COLUMN) == Some(path)))
    }

    /// Count rows in the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn row_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {AUDIO_TABLE}"),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
