//! Path scoping and file discovery.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Returns true if `candidate` lies strictly below `parent`.
///
/// Comparison is by path component, so trailing separators are ignored and
/// `/musicbox` is not below `/music`. A path is not below itself. Mixing a
/// relative and an absolute path always yields false.
#[must_use]
pub fn is_descendant(parent: &Path, candidate: &Path) -> bool {
    if parent.is_absolute() != candidate.is_absolute() {
        return false;
    }
    candidate.starts_with(parent) && candidate.components().count() > parent.components().count()
}

/// Collect regular files under `root`, recursively and in sorted order.
///
/// A file passed as `root` yields just itself. Symlinks are followed, so a
/// linked file is collected under its link path. Entries that cannot be read,
/// including broken links and link loops, are logged and skipped.
#[must_use]
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}
