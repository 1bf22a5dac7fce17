//! Export: `audio` table → audio files.
//!
//! Every stored row whose path lies below the export directory is written
//! back to its file. Only fields that differ are touched: a stored value
//! replaces the file's value, a NULL cell removes the field. Files with no
//! differences are not saved.
//!
//! Failures never stop an export. A row that cannot be written is logged and
//! counted; the remaining rows are still processed.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::model::TagValue;
use crate::storage::schema::{is_reserved, PATH_COLUMN};
use crate::storage::{MetadataRow, MetadataStore};
use crate::sync::path::is_descendant;
use crate::sync::types::{ExportOutcome, ExportStats, SyncResult};
use crate::sync::value::{decode, encode_value, value_to_path};
use crate::tags::{CodecError, TagCodec, TagFile};

/// A single change to a file's tags.
#[derive(Debug, Clone, PartialEq)]
enum Change {
    Set(String, TagValue),
    Remove(String),
}

/// Exporter for stored tags.
pub struct Exporter<'a> {
    storage: &'a MetadataStore,
    codec: &'a dyn TagCodec,
    dry_run: bool,
}

impl<'a> Exporter<'a> {
    /// Create a new exporter.
    #[must_use]
    pub fn new(storage: &'a MetadataStore, codec: &'a dyn TagCodec) -> Self {
        Self {
            storage,
            codec,
            dry_run: false,
        }
    }

    /// Compute changes without saving any file.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Write stored tags back to every file below `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be read. Per-file failures are
    /// counted in the returned stats instead.
    pub fn export(&self, target: &Path) -> SyncResult<ExportStats> {
        let target = std::path::absolute(target)?;
        let rows = self.storage.rows()?;
        let mut stats = ExportStats::default();

        for row in &rows {
            stats.rows_seen += 1;
            let outcome = self.export_row(&target, row, &mut stats);
            stats.record(outcome);
        }

        info!(
            updated = stats.updated,
            unchanged = stats.unchanged,
            failed = stats.failed,
            dry_run = self.dry_run,
            "Export completed"
        );
        Ok(stats)
    }

    fn export_row(&self, target: &Path, row: &MetadataRow, stats: &mut ExportStats) -> ExportOutcome {
        let Some(path) = row.get(PATH_COLUMN).and_then(value_to_path) else {
            warn!("Row has no path, skipping");
            return ExportOutcome::MissingPath;
        };
        if !is_descendant(target, &path) {
            debug!(path = %path.display(), "Not below export directory, skipping");
            return ExportOutcome::OutOfScope;
        }

        info!(path = %path.display(), "Export started");

        let mut file = match self.codec.open(&path) {
            Ok(file) => file,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Could not open file for export");
                return ExportOutcome::Failed;
            }
        };

        let changes = diff(row, &*file);
        if changes.is_empty() {
            debug!(path = %path.display(), "File already up to date");
            return ExportOutcome::Unchanged;
        }

        let (set, removed) = count(&changes);
        if self.dry_run {
            info!(path = %path.display(), set, removed, "Would update file");
            return ExportOutcome::WouldUpdate;
        }

        match apply(&mut *file, &changes).and_then(|()| file.save()) {
            Ok(()) => {
                info!(path = %path.display(), set, removed, "Export completed");
                stats.fields_set += set;
                stats.fields_removed += removed;
                ExportOutcome::Updated
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error occurred exporting file");
                ExportOutcome::Failed
            }
        }
    }
}

/// Changes needed to make `file` match the tag columns of `row`.
fn diff(row: &MetadataRow, file: &dyn TagFile) -> Vec<Change> {
    row.iter()
        .filter(|(name, _)| !is_reserved(name))
        .filter_map(|(name, stored)| match decode(stored) {
            None => file.contains(name).then(|| Change::Remove(name.to_string())),
            Some(desired) => {
                let current = file.get(name).map(|value| encode_value(&value));
                (current != Some(encode_value(&desired)))
                    .then(|| Change::Set(name.to_string(), desired))
            }
        })
        .collect()
}

fn count(changes: &[Change]) -> (usize, usize) {
    let set = changes
        .iter()
        .filter(|change| matches!(change, Change::Set(..)))
        .count();
    (set, changes.len() - set)
}

fn apply(file: &mut dyn TagFile, changes: &[Change]) -> Result<(), CodecError> {
    for change in changes {
        match change {
            Change::Set(name, value) => file.set(name, value)?,
            Change::Remove(name) => {
                file.remove(name);
            }
        }
    }
    Ok(())
}
