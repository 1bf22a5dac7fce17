//! Import: audio files → `audio` table.
//!
//! Every file under the import root is opened through the tag codec, its
//! fields are encoded, missing columns are added in one batch, and the
//! file's row is replaced wholesale. A file that cannot be read never stops
//! the run; what happens when storing fails depends on [`FailurePolicy`].

use std::collections::HashSet;
use std::path::Path;

use rusqlite::types::Value;
use tracing::{debug, error, info, warn};

use crate::model::TagMap;
use crate::storage::schema::{
    is_reserved, is_rowid_alias, DIRPATH_COLUMN, EXT_COLUMN, FILENAME_COLUMN, FILENAME_NO_EXT_COLUMN, PATH_COLUMN,
};
use crate::storage::{ColumnMap, MetadataStore};
use crate::sync::path::collect_files;
use crate::sync::types::{FailurePolicy, ImportOutcome, ImportStats, SyncResult};
use crate::sync::value::{encode, is_valid_field_name, os_str_to_value, path_to_value};
use crate::tags::TagCodec;

/// Importer for audio file tags.
///
/// Holds the column registry for the run; it is refreshed from the table
/// whenever columns are added.
pub struct Importer<'a> {
    storage: &'a mut MetadataStore,
    codec: &'a dyn TagCodec,
    policy: FailurePolicy,
    columns: ColumnMap,
}

impl<'a> Importer<'a> {
    /// Create a new importer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current columns cannot be read.
    pub fn new(
        storage: &'a mut MetadataStore,
        codec: &'a dyn TagCodec,
        policy: FailurePolicy,
    ) -> SyncResult<Self> {
        let columns = storage.columns()?;
        Ok(Self {
            storage,
            codec,
            policy,
            columns,
        })
    }

    /// Import every file under `root` (or `root` itself if it is a file).
    ///
    /// # Errors
    ///
    /// Returns an error only under [`FailurePolicy::Abort`], when a file's
    /// columns or row cannot be stored.
    pub fn import_path(&mut self, root: &Path) -> SyncResult<ImportStats> {
        let root = std::path::absolute(root)?;
        let mut stats = ImportStats::default();

        for path in collect_files(&root) {
            stats.files_seen += 1;
            let outcome = self.import_file(&path, &mut stats)?;
            stats.record(outcome);
        }

        info!(
            imported = stats.imported,
            failed = stats.failed,
            "Import completed"
        );
        Ok(stats)
    }

    /// Import a single file.
    ///
    /// # Errors
    ///
    /// Returns an error only under [`FailurePolicy::Abort`].
    pub fn import_file(
        &mut self,
        path: &Path,
        stats: &mut ImportStats,
    ) -> SyncResult<ImportOutcome> {
        info!(path = %path.display(), "Import started");

        let fields = match self.codec.open(path) {
            Ok(file) if !file.has_tag_data() => {
                warn!(path = %path.display(), "No tag data found, skipping");
                return Ok(ImportOutcome::NoTags);
            }
            Ok(file) => file.fields(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Could not import file");
                return Ok(ImportOutcome::Failed);
            }
        };

        let cells = normalize(path, &fields, stats);

        match self.store(path, &cells, stats) {
            Ok(()) => {
                info!(path = %path.display(), fields = cells.len(), "Imported file");
                Ok(ImportOutcome::Imported)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error occurred importing file");
                match self.policy {
                    FailurePolicy::Isolate => Ok(ImportOutcome::Failed),
                    FailurePolicy::Abort => Err(e),
                }
            }
        }
    }

    /// Add missing columns, then replace the file's row.
    fn store(
        &mut self,
        path: &Path,
        cells: &[(String, Value)],
        stats: &mut ImportStats,
    ) -> SyncResult<()> {
        let names: Vec<&str> = cells.iter().map(|(name, _)| name.as_str()).collect();
        if !self.columns.missing(names.iter().copied()).is_empty() {
            let before = self.columns.len();
            self.columns = self.storage.ensure_columns(&names)?;
            stats.columns_added += self.columns.len().saturating_sub(before);
        }

        let mut row: Vec<(&str, Value)> = reserved_cells(path);
        for (name, value) in cells {
            let column = self.columns.get(name).unwrap_or(name);
            match row.iter_mut().find(|(existing, _)| existing.eq_ignore_ascii_case(column)) {
                Some(cell) => cell.1 = value.clone(),
                None => row.push((column, value.clone())),
            }
        }

        self.storage.replace_row(&path_to_value(path), &row)?;
        Ok(())
    }
}

/// Cells for the reserved columns of a file.
fn reserved_cells(path: &Path) -> Vec<(&'static str, Value)> {
    vec![
        (PATH_COLUMN, path_to_value(path)),
        (FILENAME_COLUMN, os_str_to_value(path.file_name())),
        (DIRPATH_COLUMN, os_str_to_value(path.parent().map(Path::as_os_str))),
        (FILENAME_NO_EXT_COLUMN, os_str_to_value(path.file_stem())),
        (EXT_COLUMN, os_str_to_value(path.extension())),
    ]
}

/// Encode a file's fields, dropping names that cannot become columns.
///
/// The first of several fields differing only in case wins.
fn normalize(path: &Path, fields: &TagMap, stats: &mut ImportStats) -> Vec<(String, Value)> {
    let mut seen = HashSet::new();
    let mut cells = Vec::with_capacity(fields.len());

    for (name, value) in fields.iter() {
        if !is_valid_field_name(name) {
            warn!(
                path = %path.display(),
                field = %name.escape_default(),
                "Invalid tag found, not parsing field"
            );
            stats.fields_skipped += 1;
            continue;
        }
        if (is_reserved(name) && name != PATH_COLUMN) || is_rowid_alias(name) {
            warn!(path = %path.display(), field = %name, "Reserved field name, skipping");
            stats.fields_skipped += 1;
            continue;
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            debug!(path = %path.display(), field = %name, "Duplicate field name, keeping first");
            continue;
        }
        cells.push((name.to_string(), encode(name, value, path)));
    }

    cells
}
