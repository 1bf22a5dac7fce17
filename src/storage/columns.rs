//! Column registry for the `audio` table.
//!
//! Tag field names arrive from arbitrary files, so the table grows a new
//! TEXT column the first time a name is seen. SQLite compares identifiers
//! case-insensitively; the registry mirrors that with a two-level map from
//! lowercase lookup key to the stored (first-seen) casing.

use std::collections::{BTreeMap, HashSet};

use rusqlite::Connection;
use tracing::info;

use super::schema::{is_reserved, is_rowid_alias, AUDIO_TABLE};
use crate::error::{Error, Result};

/// Lowercase column name → stored column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<String, String>,
}

impl ColumnMap {
    /// Stored name for a column, matched case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns true if the column exists in any casing.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(&name.to_ascii_lowercase())
    }

    /// Names from `names` that have no column yet.
    ///
    /// Case-insensitive duplicates collapse to their first occurrence.
    #[must_use]
    pub fn missing<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        names
            .into_iter()
            .filter(|name| {
                let key = name.to_ascii_lowercase();
                !self.columns.contains_key(&key) && seen.insert(key)
            })
            .collect()
    }

    /// Stored names of all columns, sorted by lookup key.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }

    /// Stored names of the tag columns (everything not reserved).
    pub fn tag_columns(&self) -> impl Iterator<Item = &str> {
        self.names().filter(|name| !is_reserved(name))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut columns = BTreeMap::new();
        for name in iter {
            columns
                .entry(name.to_ascii_lowercase())
                .or_insert_with(|| name.to_string());
        }
        Self { columns }
    }
}

/// Quote an identifier for use in SQL.
///
/// Embedded double quotes are doubled, so any name is safe to splice into a
/// statement.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Check that a name may become a tag column.
///
/// # Errors
///
/// Returns [`Error::InvalidColumnName`] for empty names, names with control
/// characters, names using the reserved prefix, and row id aliases.
pub fn validate_column_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.chars().any(char::is_control) {
        "name contains control characters"
    } else if is_reserved(name) {
        "name uses the reserved '__' prefix"
    } else if is_rowid_alias(name) {
        "name would shadow the row id"
    } else {
        return Ok(());
    };
    Err(Error::InvalidColumnName {
        name: name.escape_default().to_string(),
        reason: reason.to_string(),
    })
}

/// Read the current column set from the table definition.
///
/// # Errors
///
/// Returns an error if the table cannot be introspected.
pub fn current_columns(conn: &Connection) -> Result<ColumnMap> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name FROM pragma_table_info('{AUDIO_TABLE}')"
    ))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().map(String::as_str).collect())
}

/// Add a TEXT column for every name not yet in the table.
///
/// All additions happen in one transaction: if any name is rejected, no
/// column is added. Names already present in any casing are skipped.
///
/// # Errors
///
/// Returns an error if a name is invalid or the store rejects the change.
pub fn ensure_columns(conn: &mut Connection, names: &[&str]) -> Result<ColumnMap> {
    let current = current_columns(conn)?;
    let missing = current.missing(names.iter().copied());
    if missing.is_empty() {
        return Ok(current);
    }

    for name in &missing {
        validate_column_name(name)?;
    }

    let tx = conn.transaction()?;
    for name in &missing {
        tx.execute(
            &format!(
                "ALTER TABLE {AUDIO_TABLE} ADD COLUMN {} TEXT",
                quote_identifier(name)
            ),
            [],
        )?;
    }
    tx.commit()?;

    for name in &missing {
        info!(column = %name, "Created column");
    }

    current_columns(conn)
}
