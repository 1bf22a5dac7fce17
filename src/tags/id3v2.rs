//! ID3v2 tag codec for MP3 files.
//!
//! Multi-valued text frames are stored NUL-separated, as ID3v2.4 defines.
//! Tags are always written back as ID3v2.4.

use std::path::{Path, PathBuf};

use id3::frame::{Comment, Content, ExtendedText, Lyrics, Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};

use super::frames::{
    field_for_frame, frame_for_field, FrameTarget, COMMENT_FIELD, LYRICS_FIELD, PICTURE_FIELD,
};
use super::{has_extension, CodecError, TagCodec, TagFile};
use crate::model::{TagMap, TagValue};

const SUPPORTED_EXTENSIONS: &[&str] = &["mp3"];

/// Codec for ID3v2-tagged MP3 files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3Codec;

impl Id3Codec {
    /// Returns true if the file extension is handled by this codec.
    #[must_use]
    pub fn supports(path: &Path) -> bool {
        has_extension(path, SUPPORTED_EXTENSIONS)
    }
}

impl TagCodec for Id3Codec {
    fn open(&self, path: &Path) -> Result<Box<dyn TagFile>, CodecError> {
        if !Self::supports(path) {
            return Err(CodecError::Unsupported {
                path: path.to_path_buf(),
            });
        }

        let (tag, had_tag) = match Tag::read_from_path(path) {
            Ok(tag) => (tag, true),
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => (Tag::new(), false),
            Err(e) => {
                return Err(CodecError::Read {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        Ok(Box::new(Id3File {
            path: path.to_path_buf(),
            tag,
            had_tag,
        }))
    }
}

struct Id3File {
    path: PathBuf,
    tag: Tag,
    had_tag: bool,
}

impl TagFile for Id3File {
    fn has_tag_data(&self) -> bool {
        self.had_tag && self.tag.frames().next().is_some()
    }

    fn fields(&self) -> TagMap {
        read_fields(&self.tag)
    }

    fn get(&self, name: &str) -> Option<TagValue> {
        read_fields(&self.tag).get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &TagValue) -> Result<(), CodecError> {
        let invalid = |message: &str| CodecError::InvalidValue {
            field: name.to_string(),
            message: message.to_string(),
        };
        let text = || value.text_values().join("\0");

        match (frame_for_field(name), value) {
            (FrameTarget::Picture, TagValue::Binary(data)) => {
                self.remove(name);
                self.tag.add_frame(Picture {
                    mime_type: sniff_mime(data).to_string(),
                    picture_type: PictureType::CoverFront,
                    description: String::new(),
                    data: data.clone(),
                });
            }
            (FrameTarget::Picture, _) => return Err(invalid("picture data must be binary")),
            (_, TagValue::Binary(_)) => {
                return Err(invalid("binary data is only supported for pictures"));
            }
            (FrameTarget::Text(id), _) => {
                self.remove(name);
                self.tag.set_text(id, text());
            }
            (FrameTarget::UserText(description), _) => {
                self.remove(name);
                self.tag.add_frame(ExtendedText {
                    description: description.to_string(),
                    value: text(),
                });
            }
            (FrameTarget::Comment, _) => {
                self.remove(name);
                self.tag.add_frame(Comment {
                    lang: "eng".to_string(),
                    description: String::new(),
                    text: text(),
                });
            }
            (FrameTarget::Lyrics, _) => {
                self.remove(name);
                self.tag.add_frame(Lyrics {
                    lang: "eng".to_string(),
                    description: String::new(),
                    text: text(),
                });
            }
        }
        Ok(())
    }

    fn remove(&mut self, name: &str) -> bool {
        match frame_for_field(name) {
            FrameTarget::Text(_) => {
                // Several frames can map to one field (TDRC and TYER are both "year")
                let ids: Vec<String> = self
                    .tag
                    .frames()
                    .filter(|f| {
                        field_for_frame(f.id()).is_some_and(|n| n.eq_ignore_ascii_case(name))
                    })
                    .map(|f| f.id().to_string())
                    .collect();
                let mut removed = false;
                for id in ids {
                    removed |= !self.tag.remove(&id).is_empty();
                }
                removed
            }
            FrameTarget::UserText(_) => {
                let descriptions: Vec<String> = self
                    .tag
                    .extended_texts()
                    .filter(|et| et.description.eq_ignore_ascii_case(name))
                    .map(|et| et.description.clone())
                    .collect();
                for description in &descriptions {
                    self.tag.remove_extended_text(Some(description.as_str()), None);
                }
                !descriptions.is_empty()
            }
            FrameTarget::Comment => remove_frames(&mut self.tag, "COMM", is_plain_comment),
            FrameTarget::Lyrics => remove_frames(&mut self.tag, "USLT", is_plain_lyrics),
            FrameTarget::Picture => remove_frames(&mut self.tag, "APIC", is_front_cover),
        }
    }

    fn save(&mut self) -> Result<(), CodecError> {
        self.tag
            .write_to_path(&self.path, Version::Id3v24)
            .map_err(|e| CodecError::Write {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        self.had_tag = true;
        Ok(())
    }
}

/// Collect every supported frame into a field map. The first frame for a
/// field wins.
fn read_fields(tag: &Tag) -> TagMap {
    let mut fields = TagMap::new();
    let mut add = |name: &str, value: Option<TagValue>| {
        if let Some(value) = value {
            if !fields.contains(name) {
                fields.insert(name, value);
            }
        }
    };

    for frame in tag.frames() {
        match frame.content() {
            Content::Text(text) => {
                if let Some(name) = field_for_frame(frame.id()) {
                    add(name, split_text(text));
                }
            }
            Content::ExtendedText(et) => add(&et.description, split_text(&et.value)),
            Content::Comment(c) if is_plain_comment(frame.content()) => {
                add(COMMENT_FIELD, split_text(&c.text));
            }
            Content::Lyrics(l) if is_plain_lyrics(frame.content()) => {
                add(LYRICS_FIELD, split_text(&l.text));
            }
            Content::Picture(p) if is_front_cover(frame.content()) && !p.data.is_empty() => {
                add(PICTURE_FIELD, Some(TagValue::Binary(p.data.clone())));
            }
            _ => {}
        }
    }

    fields
}

/// The comment field is the `COMM` frame without a description. Described
/// comments (`iTunNORM`, `iTunSMPB`, ...) belong to other tools.
fn is_plain_comment(content: &Content) -> bool {
    matches!(content, Content::Comment(c) if c.description.is_empty())
}

fn is_plain_lyrics(content: &Content) -> bool {
    matches!(content, Content::Lyrics(l) if l.description.is_empty())
}

fn is_front_cover(content: &Content) -> bool {
    matches!(content, Content::Picture(p) if p.picture_type == PictureType::CoverFront)
}

/// Remove the `id` frames whose content matches, keeping the others.
fn remove_frames(tag: &mut Tag, id: &str, matches: fn(&Content) -> bool) -> bool {
    let mut removed = false;
    for frame in tag.remove(id) {
        if matches(frame.content()) {
            removed = true;
        } else {
            tag.add_frame(frame);
        }
    }
    removed
}

fn split_text(text: &str) -> Option<TagValue> {
    let mut values: Vec<String> = text
        .split('\0')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    match values.len() {
        0 => None,
        1 => values.pop().map(TagValue::Text),
        _ => Some(TagValue::List(values)),
    }
}

fn sniff_mime(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_fields_from_tag() {
        let mut tag = Tag::new();
        tag.set_text("TPE1", "A");
        tag.set_text("TCON", "Rock\0Pop");
        tag.add_frame(ExtendedText {
            description: "CATALOG".to_string(),
            value: "X-1".to_string(),
        });

        let fields = read_fields(&tag);

        assert_eq!(fields.get("artist"), Some(&TagValue::from("A")));
        assert_eq!(fields.get("genre"), Some(&TagValue::from(vec!["Rock", "Pop"])));
        assert_eq!(fields.get("catalog"), Some(&TagValue::from("X-1")));
    }

    #[test]
    fn test_split_text() {
        assert_eq!(split_text(""), None);
        assert_eq!(split_text("A"), Some(TagValue::from("A")));
        assert_eq!(split_text("A\0\0B"), Some(TagValue::from(vec!["A", "B"])));
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(&[0x89, b'P', b'N', b'G', 0x0d]), "image/png");
        assert_eq!(sniff_mime(&[0xff, 0xd8, 0xff]), "image/jpeg");
    }

    #[test]
    fn test_open_unsupported_extension() {
        let result = Id3Codec.open(Path::new("/music/cover.jpg"));
        assert!(matches!(result, Err(CodecError::Unsupported { .. })));
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Id3Codec.open(&temp_dir.path().join("missing.mp3"));
        assert!(matches!(result, Err(CodecError::Read { .. })));
    }

    #[test]
    fn test_untagged_file_then_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.mp3");
        std::fs::write(&path, b"not really audio").unwrap();

        let mut file = Id3Codec.open(&path).unwrap();
        assert!(!file.has_tag_data());

        file.set("artist", &TagValue::from("A")).unwrap();
        file.set("Genre", &TagValue::from(vec!["Rock", "Pop"])).unwrap();
        file.save().unwrap();
        drop(file);

        let file = Id3Codec.open(&path).unwrap();
        assert!(file.has_tag_data());
        assert_eq!(file.get("artist"), Some(TagValue::from("A")));
        assert_eq!(file.get("genre"), Some(TagValue::from(vec!["Rock", "Pop"])));
    }

    #[test]
    fn test_set_and_remove_user_text() {
        let mut file = Id3File {
            path: PathBuf::from("/music/song.mp3"),
            tag: Tag::new(),
            had_tag: false,
        };

        file.set("Mood Board", &TagValue::from("calm")).unwrap();
        assert!(file.contains("mood board"));

        assert!(file.remove("MOOD BOARD"));
        assert!(!file.contains("mood board"));
        assert!(!file.remove("mood board"));
    }

    fn described_comment(description: &str, text: &str) -> Comment {
        Comment {
            lang: "eng".to_string(),
            description: description.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_comment_ignores_described_frames() {
        let mut tag = Tag::new();
        tag.add_frame(described_comment("iTunNORM", "00000A1B"));
        tag.add_frame(described_comment("", "hello"));
        let mut file = Id3File {
            path: PathBuf::from("/music/song.mp3"),
            tag,
            had_tag: true,
        };

        assert_eq!(file.get("comment"), Some(TagValue::from("hello")));

        file.set("comment", &TagValue::from("edited")).unwrap();
        let mut comments: Vec<(String, String)> = file
            .tag
            .comments()
            .map(|c| (c.description.clone(), c.text.clone()))
            .collect();
        comments.sort();
        assert_eq!(
            comments,
            vec![
                (String::new(), "edited".to_string()),
                ("iTunNORM".to_string(), "00000A1B".to_string()),
            ]
        );

        assert!(file.remove("comment"));
        assert_eq!(file.get("comment"), None);
        assert_eq!(file.tag.comments().count(), 1);
    }

    #[test]
    fn test_only_described_comment_is_not_a_comment() {
        let mut tag = Tag::new();
        tag.add_frame(described_comment("iTunSMPB", "0 0 0"));
        let mut file = Id3File {
            path: PathBuf::from("/music/song.mp3"),
            tag,
            had_tag: true,
        };

        assert!(!file.contains("comment"));
        assert!(!file.remove("comment"));
        assert_eq!(file.tag.comments().count(), 1);
    }

    #[test]
    fn test_lyrics_keep_described_frames() {
        let mut tag = Tag::new();
        tag.add_frame(Lyrics {
            lang: "eng".to_string(),
            description: "romanized".to_string(),
            text: "kept".to_string(),
        });
        let mut file = Id3File {
            path: PathBuf::from("/music/song.mp3"),
            tag,
            had_tag: true,
        };

        assert_eq!(file.get("lyrics"), None);
        file.set("lyrics", &TagValue::from("la la")).unwrap();

        assert_eq!(file.get("lyrics"), Some(TagValue::from("la la")));
        assert_eq!(file.tag.lyrics().count(), 2);
    }

    #[test]
    fn test_picture_replaces_front_cover_only() {
        let mut tag = Tag::new();
        tag.add_frame(Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: PictureType::CoverBack,
            description: String::new(),
            data: vec![0xff, 0xd8, 0x01],
        });
        let mut file = Id3File {
            path: PathBuf::from("/music/song.mp3"),
            tag,
            had_tag: true,
        };

        assert_eq!(file.get("picture"), None);
        file.set("picture", &TagValue::Binary(vec![0xff, 0xd8, 0x02]))
            .unwrap();
        assert_eq!(file.tag.pictures().count(), 2);

        assert!(file.remove("picture"));
        let remaining: Vec<PictureType> =
            file.tag.pictures().map(|p| p.picture_type).collect();
        assert_eq!(remaining, vec![PictureType::CoverBack]);
    }

    #[test]
    fn test_binary_rejected_for_text_frame() {
        let mut file = Id3File {
            path: PathBuf::from("/music/song.mp3"),
            tag: Tag::new(),
            had_tag: false,
        };

        let result = file.set("artist", &TagValue::Binary(vec![1, 2, 3]));
        assert!(matches!(result, Err(CodecError::InvalidValue { .. })));

        file.set("picture", &TagValue::Binary(vec![0xff, 0xd8])).unwrap();
        assert_eq!(file.get("picture"), Some(TagValue::Binary(vec![0xff, 0xd8])));
    }
}
