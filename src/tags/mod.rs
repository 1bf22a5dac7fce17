//! Tag codec seam.
//!
//! The sync engines never touch audio formats directly. They open files
//! through a [`TagCodec`] and work with the returned [`TagFile`] handle as a
//! case-insensitive mapping from field name to [`TagValue`].
//!
//! - [`AudioCodec`] - picks one of the file codecs by extension
//! - [`Id3Codec`] - MP3 files via the `id3` crate
//! - [`VorbisCodec`] - FLAC, Ogg Vorbis and Opus files via `lofty`
//! - [`MemoryCodec`] - in-memory files, used by tests

mod frames;
mod id3v2;
mod memory;
mod vorbis;

pub use id3v2::Id3Codec;
pub use memory::MemoryCodec;
pub use vorbis::VorbisCodec;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::model::{TagMap, TagValue};

/// Errors raised by a tag codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The file format is not handled by this codec.
    #[error("Unsupported file: {}", path.display())]
    Unsupported { path: PathBuf },

    /// The file exists but its tags could not be read.
    #[error("Could not read tags from {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// Persisting tags failed.
    #[error("Could not save tags to {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// A value cannot be stored in the named field.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Opens audio files for tag access.
pub trait TagCodec {
    /// Open a file's tags.
    ///
    /// A readable file without any tag data still opens; check
    /// [`TagFile::has_tag_data`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or its format unsupported.
    fn open(&self, path: &Path) -> Result<Box<dyn TagFile>, CodecError>;
}

/// An open file's tags.
///
/// Field names compare case-insensitively. Changes are held in memory until
/// [`TagFile::save`] is called; dropping the handle discards them.
pub trait TagFile {
    /// Returns false for a valid file that carries no tag data at all.
    fn has_tag_data(&self) -> bool;

    /// All fields in file order.
    fn fields(&self) -> TagMap;

    /// Current value of a field.
    fn get(&self, name: &str) -> Option<TagValue>;

    /// Returns true if the field is present.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in this format.
    fn set(&mut self, name: &str, value: &TagValue) -> Result<(), CodecError>;

    /// Remove a field. Returns true if something was removed.
    fn remove(&mut self, name: &str) -> bool;

    /// Persist pending changes to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid or not writable.
    fn save(&mut self) -> Result<(), CodecError>;
}

/// Codec for every supported audio format, dispatching on file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioCodec;

impl TagCodec for AudioCodec {
    fn open(&self, path: &Path) -> Result<Box<dyn TagFile>, CodecError> {
        if Id3Codec::supports(path) {
            Id3Codec.open(path)
        } else if VorbisCodec::supports(path) {
            VorbisCodec.open(path)
        } else {
            Err(CodecError::Unsupported {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Returns true if the path's extension is one of `extensions`, ignoring case.
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
