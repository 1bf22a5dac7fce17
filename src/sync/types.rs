//! Sync types shared by import and export.

use serde::Serialize;

/// What to do when storing a file's row fails during import.
///
/// Covers both column creation and the row replace itself. Tag read
/// failures are always isolated to the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure, count the file as failed, and continue.
    #[default]
    Isolate,
    /// Stop the run and return the error.
    Abort,
}

/// How a single file ended up after import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Row replaced with the file's tags.
    Imported,
    /// File opened but had no tag data.
    NoTags,
    /// File could not be read or stored.
    Failed,
}

/// How a single row ended up after export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Changes were written to the file.
    Updated,
    /// The file already matched the row.
    Unchanged,
    /// Changes were computed but not saved (dry run).
    WouldUpdate,
    /// The row's path is not below the export directory.
    OutOfScope,
    /// The row has no usable path.
    MissingPath,
    /// The file could not be opened, changed, or saved.
    Failed,
}

/// Statistics for an import run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Files discovered under the import root.
    pub files_seen: usize,
    /// Files whose row was written.
    pub imported: usize,
    /// Files without tag data.
    pub no_tags: usize,
    /// Files that could not be read or stored.
    pub failed: usize,
    /// Individual fields dropped for invalid or reserved names.
    pub fields_skipped: usize,
    /// Columns added to the table.
    pub columns_added: usize,
}

impl ImportStats {
    /// Record the outcome of one file.
    pub fn record(&mut self, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Imported => self.imported += 1,
            ImportOutcome::NoTags => self.no_tags += 1,
            ImportOutcome::Failed => self.failed += 1,
        }
    }
}

/// Statistics for an export run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Rows read from the table.
    pub rows_seen: usize,
    /// Files written.
    pub updated: usize,
    /// Files already matching their row.
    pub unchanged: usize,
    /// Files that would be written (dry run).
    pub would_update: usize,
    /// Rows outside the export directory.
    pub out_of_scope: usize,
    /// Rows without a usable path.
    pub missing_path: usize,
    /// Files that could not be opened, changed, or saved.
    pub failed: usize,
    /// Fields set across all written files.
    pub fields_set: usize,
    /// Fields removed across all written files.
    pub fields_removed: usize,
}

impl ExportStats {
    /// Record the outcome of one row.
    pub fn record(&mut self, outcome: ExportOutcome) {
        match outcome {
            ExportOutcome::Updated => self.updated += 1,
            ExportOutcome::Unchanged => self.unchanged += 1,
            ExportOutcome::WouldUpdate => self.would_update += 1,
            ExportOutcome::OutOfScope => self.out_of_scope += 1,
            ExportOutcome::MissingPath => self.missing_path += 1,
            ExportOutcome::Failed => self.failed += 1,
        }
    }
}

/// Sync-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// A column could not be added.
    #[error("Schema error: {0}")]
    Schema(String),
}

impl From<rusqlite::Error> for SyncError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<crate::error::Error> for SyncError {
    fn from(err: crate::error::Error) -> Self {
        match err {
            crate::error::Error::InvalidColumnName { .. } => Self::Schema(err.to_string()),
            crate::error::Error::Io(e) => Self::Io(e),
            other => Self::Database(other.to_string()),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
