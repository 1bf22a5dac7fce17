//! Vorbis comment codec for FLAC, Ogg Vorbis and Opus files.
//!
//! Vorbis comments are flat `KEY=value` pairs where a key may repeat. A
//! repeated key reads as a list and a list writes one pair per element.
//! Keys read back lowercase so they line up with the MP3 field names;
//! `TRACKNUMBER` and `DATE` become `track` and `year`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use lofty::config::{ParseOptions, WriteOptions};
use lofty::error::LoftyError;
use lofty::flac::FlacFile;
use lofty::ogg::{OpusFile, VorbisComments, VorbisFile};
use lofty::prelude::*;

use super::{has_extension, CodecError, TagCodec, TagFile};
use crate::model::{TagMap, TagValue};

const SUPPORTED_EXTENSIONS: &[&str] = &["flac", "ogg", "oga", "opus"];

/// Vorbis keys with a different field name.
const KEY_ALIASES: &[(&str, &str)] = &[("TRACKNUMBER", "track"), ("DATE", "year")];

/// Codec for Vorbis comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct VorbisCodec;

impl VorbisCodec {
    /// Returns true if the file extension is handled by this codec.
    #[must_use]
    pub fn supports(path: &Path) -> bool {
        has_extension(path, SUPPORTED_EXTENSIONS)
    }
}

/// The parsed file, kept whole so saving preserves FLAC picture blocks.
enum Container {
    Flac(FlacFile),
    Vorbis(VorbisFile),
    Opus(OpusFile),
}

impl Container {
    fn read(path: &Path, file: &mut File) -> Result<Option<Self>, LoftyError> {
        let options = ParseOptions::new().read_properties(false);
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let container = match ext.as_deref() {
            Some("flac") => Self::Flac(FlacFile::read_from(file, options)?),
            Some("ogg" | "oga") => Self::Vorbis(VorbisFile::read_from(file, options)?),
            Some("opus") => Self::Opus(OpusFile::read_from(file, options)?),
            _ => return Ok(None),
        };
        Ok(Some(container))
    }

    fn comments(&self) -> Option<&VorbisComments> {
        match self {
            Self::Flac(f) => f.vorbis_comments(),
            Self::Vorbis(f) => Some(f.vorbis_comments()),
            Self::Opus(f) => Some(f.vorbis_comments()),
        }
    }

    fn set_comments(&mut self, comments: VorbisComments) {
        match self {
            Self::Flac(f) => {
                f.set_vorbis_comments(comments);
            }
            Self::Vorbis(f) => {
                f.set_vorbis_comments(comments);
            }
            Self::Opus(f) => {
                f.set_vorbis_comments(comments);
            }
        }
    }

    fn save_to(&self, file: &mut File) -> Result<(), LoftyError> {
        let options = WriteOptions::default();
        match self {
            Self::Flac(f) => f.save_to(file, options),
            Self::Vorbis(f) => f.save_to(file, options),
            Self::Opus(f) => f.save_to(file, options),
        }
    }
}

impl TagCodec for VorbisCodec {
    fn open(&self, path: &Path) -> Result<Box<dyn TagFile>, CodecError> {
        let read_error = |message: String| CodecError::Read {
            path: path.to_path_buf(),
            message,
        };

        let mut file = File::open(path).map_err(|e| read_error(e.to_string()))?;
        let container = Container::read(path, &mut file)
            .map_err(|e| read_error(e.to_string()))?
            .ok_or_else(|| CodecError::Unsupported {
                path: path.to_path_buf(),
            })?;
        let comments = container.comments().cloned().unwrap_or_default();

        Ok(Box::new(CommentFile {
            path: path.to_path_buf(),
            container,
            comments,
        }))
    }
}

struct CommentFile {
    path: PathBuf,
    container: Container,
    comments: VorbisComments,
}

impl TagFile for CommentFile {
    fn has_tag_data(&self) -> bool {
        self.comments.items().next().is_some()
    }

    fn fields(&self) -> TagMap {
        read_fields(&self.comments)
    }

    fn get(&self, name: &str) -> Option<TagValue> {
        read_fields(&self.comments).get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &TagValue) -> Result<(), CodecError> {
        set_field(&mut self.comments, name, value)
    }

    fn remove(&mut self, name: &str) -> bool {
        remove_field(&mut self.comments, name)
    }

    fn save(&mut self) -> Result<(), CodecError> {
        let write_error = |message: String| CodecError::Write {
            path: self.path.clone(),
            message,
        };

        self.container.set_comments(self.comments.clone());
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| write_error(e.to_string()))?;
        self.container
            .save_to(&mut file)
            .map_err(|e| write_error(e.to_string()))
    }
}

fn field_for_key(key: &str) -> String {
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
        .map_or_else(|| key.to_ascii_lowercase(), |&(_, field)| field.to_string())
}

fn key_for_field(name: &str) -> String {
    KEY_ALIASES
        .iter()
        .find(|(_, field)| field.eq_ignore_ascii_case(name))
        .map_or(name, |&(key, _)| key)
        .to_ascii_uppercase()
}

/// Group repeated keys into fields. When two keys map to one field name
/// (`DATE` and `YEAR`), the key that appears first wins.
fn read_fields(comments: &VorbisComments) -> TagMap {
    let mut keys: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in comments.items() {
        if value.is_empty() {
            continue;
        }
        match keys.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, values)) => values.push(value.to_string()),
            None => keys.push((key.to_string(), vec![value.to_string()])),
        }
    }

    let mut fields = TagMap::new();
    for (key, mut values) in keys {
        let name = field_for_key(&key);
        if fields.contains(&name) {
            continue;
        }
        let value = if values.len() == 1 {
            TagValue::Text(values.remove(0))
        } else {
            TagValue::List(values)
        };
        fields.insert(name, value);
    }
    fields
}

fn set_field(comments: &mut VorbisComments, name: &str, value: &TagValue) -> Result<(), CodecError> {
    let invalid = |message: &str| CodecError::InvalidValue {
        field: name.to_string(),
        message: message.to_string(),
    };

    if matches!(value, TagValue::Binary(_)) {
        return Err(invalid("binary data is not supported in Vorbis comments"));
    }
    // Keys are printable ASCII without '='
    if name.is_empty() || !name.bytes().all(|b| (0x20..=0x7d).contains(&b) && b != b'=') {
        return Err(invalid("not a valid Vorbis comment key"));
    }

    remove_field(comments, name);
    let key = key_for_field(name);
    for text in value.text_values() {
        comments.push(key.clone(), text);
    }
    Ok(())
}

/// Remove every key that reads as this field.
fn remove_field(comments: &mut VorbisComments, name: &str) -> bool {
    let keys: Vec<String> = comments
        .items()
        .filter(|(key, _)| field_for_key(key).eq_ignore_ascii_case(name))
        .map(|(key, _)| key.to_string())
        .collect();
    for key in &keys {
        comments.remove(key).for_each(drop);
    }
    !keys.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A FLAC stream with only a STREAMINFO block: 44.1 kHz, stereo, 16 bit.
    fn minimal_flac() -> Vec<u8> {
        let mut bytes = b"fLaC".to_vec();
        bytes.extend_from_slice(&[0x80, 0x00, 0x00, 0x22]);
        bytes.extend_from_slice(&[0x10, 0x00, 0x10, 0x00]);
        bytes.extend_from_slice(&[0x00; 6]);
        bytes.extend_from_slice(&[0x0a, 0xc4, 0x42, 0xf0, 0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x00; 16]);
        bytes
    }

    fn comments(pairs: &[(&str, &str)]) -> VorbisComments {
        let mut comments = VorbisComments::default();
        for &(key, value) in pairs {
            comments.push(key.to_string(), value.to_string());
        }
        comments
    }

    fn items(comments: &VorbisComments) -> Vec<(String, String)> {
        comments
            .items()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_read_fields_groups_repeated_keys() {
        let comments = comments(&[
            ("ARTIST", "A"),
            ("GENRE", "Rock"),
            ("TRACKNUMBER", "3"),
            ("genre", "Pop"),
            ("DATE", "1999"),
            ("YEAR", "2001"),
            ("COMMENT", ""),
        ]);

        let fields = read_fields(&comments);

        assert_eq!(fields.get("artist"), Some(&TagValue::from("A")));
        assert_eq!(fields.get("genre"), Some(&TagValue::from(vec!["Rock", "Pop"])));
        assert_eq!(fields.get("track"), Some(&TagValue::from("3")));
        assert_eq!(fields.get("year"), Some(&TagValue::from("1999")));
        assert!(!fields.contains("comment"));
        assert!(!fields.contains("tracknumber"));
    }

    #[test]
    fn test_set_field_writes_aliases_and_lists() {
        let mut comments = comments(&[("tracknumber", "1"), ("ALBUM", "Kept")]);

        set_field(&mut comments, "Track", &TagValue::from("2")).unwrap();
        set_field(&mut comments, "genre", &TagValue::from(vec!["Rock", "Pop"])).unwrap();

        let mut written = items(&comments);
        written.sort();
        assert_eq!(
            written,
            vec![
                ("ALBUM".to_string(), "Kept".to_string()),
                ("GENRE".to_string(), "Pop".to_string()),
                ("GENRE".to_string(), "Rock".to_string()),
                ("TRACKNUMBER".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_field_rejects_binary_and_bad_keys() {
        let mut comments = comments(&[("ARTIST", "A")]);

        let binary = set_field(&mut comments, "picture", &TagValue::Binary(vec![1, 2]));
        let bad_key = set_field(&mut comments, "a=b", &TagValue::from("x"));
        let non_ascii = set_field(&mut comments, "künstler", &TagValue::from("x"));

        assert!(matches!(binary, Err(CodecError::InvalidValue { .. })));
        assert!(matches!(bad_key, Err(CodecError::InvalidValue { .. })));
        assert!(matches!(non_ascii, Err(CodecError::InvalidValue { .. })));
        assert_eq!(items(&comments), vec![("ARTIST".to_string(), "A".to_string())]);
    }

    #[test]
    fn test_remove_field_covers_alias_keys() {
        let mut comments = comments(&[("DATE", "1999"), ("year", "2001"), ("ARTIST", "A")]);

        assert!(remove_field(&mut comments, "YEAR"));
        assert!(!remove_field(&mut comments, "year"));
        assert_eq!(items(&comments), vec![("ARTIST".to_string(), "A".to_string())]);
    }

    #[test]
    fn test_open_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.mp3");
        fs::write(&path, b"").unwrap();

        let result = VorbisCodec.open(&path);
        assert!(matches!(result, Err(CodecError::Unsupported { .. })));
    }

    #[test]
    fn test_open_invalid_flac() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.flac");
        fs::write(&path, b"not really audio").unwrap();

        let result = VorbisCodec.open(&path);
        assert!(matches!(result, Err(CodecError::Read { .. })));
    }

    #[test]
    fn test_flac_save_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.flac");
        fs::write(&path, minimal_flac()).unwrap();

        let mut file = VorbisCodec.open(&path).unwrap();
        assert!(!file.has_tag_data());

        file.set("Artist", &TagValue::from("A")).unwrap();
        file.set("genre", &TagValue::from(vec!["Rock", "Pop"])).unwrap();
        file.set("year", &TagValue::from("1999")).unwrap();
        file.save().unwrap();
        drop(file);

        let mut file = VorbisCodec.open(&path).unwrap();
        assert!(file.has_tag_data());
        assert_eq!(file.get("artist"), Some(TagValue::from("A")));
        assert_eq!(file.get("genre"), Some(TagValue::from(vec!["Rock", "Pop"])));
        assert_eq!(file.get("year"), Some(TagValue::from("1999")));

        assert!(file.remove("genre"));
        file.save().unwrap();
        drop(file);

        let file = VorbisCodec.open(&path).unwrap();
        assert!(!file.contains("genre"));
        assert_eq!(file.get("artist"), Some(TagValue::from("A")));
    }
}
