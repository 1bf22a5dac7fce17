//! In-memory tag codec.
//!
//! Files exist only as entries in a shared map, so engines can be driven
//! without real audio. Clones share the same files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{CodecError, TagCodec, TagFile};
use crate::model::{TagMap, TagValue};

#[derive(Debug, Clone, Default)]
struct MemoryEntry {
    /// `None` means a valid file without tag data.
    tags: Option<TagMap>,
    fail_save: bool,
}

/// Codec over a shared in-memory set of files.
#[derive(Debug, Clone, Default)]
pub struct MemoryCodec {
    files: Arc<Mutex<HashMap<PathBuf, MemoryEntry>>>,
}

impl MemoryCodec {
    /// Create a codec with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, MemoryEntry>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a file with the given tags, replacing any previous entry.
    pub fn add_file(&self, path: impl Into<PathBuf>, tags: TagMap) {
        self.files().insert(
            path.into(),
            MemoryEntry {
                tags: Some(tags),
                fail_save: false,
            },
        );
    }

    /// Register a readable file that has no tag data.
    pub fn add_untagged(&self, path: impl Into<PathBuf>) {
        self.files().insert(path.into(), MemoryEntry::default());
    }

    /// Make every later save to this file fail.
    pub fn fail_saves(&self, path: &Path) {
        if let Some(entry) = self.files().get_mut(path) {
            entry.fail_save = true;
        }
    }

    /// Current persisted tags of a file.
    ///
    /// Returns `None` for unknown or untagged files.
    #[must_use]
    pub fn tags(&self, path: &Path) -> Option<TagMap> {
        self.files().get(path).and_then(|entry| entry.tags.clone())
    }
}

impl TagCodec for MemoryCodec {
    fn open(&self, path: &Path) -> Result<Box<dyn TagFile>, CodecError> {
        let entry = self
            .files()
            .get(path)
            .cloned()
            .ok_or_else(|| CodecError::Unsupported {
                path: path.to_path_buf(),
            })?;

        Ok(Box::new(MemoryFile {
            codec: self.clone(),
            path: path.to_path_buf(),
            had_tag: entry.tags.as_ref().is_some_and(|t| !t.is_empty()),
            tags: entry.tags.unwrap_or_default(),
        }))
    }
}

struct MemoryFile {
    codec: MemoryCodec,
    path: PathBuf,
    tags: TagMap,
    had_tag: bool,
}

impl TagFile for MemoryFile {
    fn has_tag_data(&self) -> bool {
        self.had_tag
    }

    fn fields(&self) -> TagMap {
        self.tags.clone()
    }

    fn get(&self, name: &str) -> Option<TagValue> {
        self.tags.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &TagValue) -> Result<(), CodecError> {
        self.tags.insert(name, value.clone());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> bool {
        self.tags.remove(name).is_some()
    }

    fn save(&mut self) -> Result<(), CodecError> {
        let mut files = self.codec.files();
        let entry = files.entry(self.path.clone()).or_default();
        if entry.fail_save {
            return Err(CodecError::Write {
                path: self.path.clone(),
                message: "file is read-only".to_string(),
            });
        }
        entry.tags = Some(self.tags.clone());
        self.had_tag = !self.tags.is_empty();
        Ok(())
    }
}
