//! Database schema definitions.
//!
//! The `audio` table starts with the reserved columns only. Tag columns are
//! added at runtime by [`super::columns::ensure_columns`].

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Name of the metadata table.
pub const AUDIO_TABLE: &str = "audio";

/// Prefix shared by every reserved column. Tag columns never use it.
pub const RESERVED_PREFIX: &str = "__";

/// Unique key: the file's absolute path as raw bytes.
pub const PATH_COLUMN: &str = "__path";
pub const FILENAME_COLUMN: &str = "__filename";
pub const DIRPATH_COLUMN: &str = "__dirpath";
pub const FILENAME_NO_EXT_COLUMN: &str = "__filename_no_ext";
pub const EXT_COLUMN: &str = "__ext";

/// All reserved columns, in table order.
pub const RESERVED_COLUMNS: &[&str] = &[
    PATH_COLUMN,
    FILENAME_COLUMN,
    DIRPATH_COLUMN,
    FILENAME_NO_EXT_COLUMN,
    EXT_COLUMN,
];

/// The base SQL schema.
///
/// Path columns are BLOBs so non-UTF-8 file names survive unchanged.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS audio (
    __path BLOB UNIQUE,
    __filename BLOB,
    __dirpath BLOB,
    __filename_no_ext BLOB,
    __ext BLOB
);
";

/// Names SQLite resolves to the row id unless a column shadows them.
pub const ROWID_ALIASES: &[&str] = &["rowid", "oid", "_rowid_"];

/// Returns true if a column name would shadow the row id.
#[must_use]
pub fn is_rowid_alias(name: &str) -> bool {
    ROWID_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(name))
}

/// Returns true if a column name is reserved.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Apply pragmas and the base schema.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;

    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}
