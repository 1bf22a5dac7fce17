//! Mapping between ID3v2 frames and tag field names.
//!
//! Well-known text frames get friendly lowercase names (`TPE1` is `artist`).
//! Unknown text frames keep their four-character ID, and `TXXX` frames are
//! addressed by their description.

/// Text frames with friendly field names.
const TEXT_FRAMES: &[(&str, &str)] = &[
    ("TIT2", "title"),
    ("TPE1", "artist"),
    ("TALB", "album"),
    ("TPE2", "albumartist"),
    ("TCOM", "composer"),
    ("TCON", "genre"),
    ("TRCK", "track"),
    ("TPOS", "discnumber"),
    ("TDRC", "year"),
    ("TYER", "year"),
    ("TIT1", "grouping"),
    ("TIT3", "subtitle"),
    ("TEXT", "lyricist"),
    ("TPE3", "conductor"),
    ("TPE4", "remixer"),
    ("TPUB", "publisher"),
    ("TBPM", "bpm"),
    ("TKEY", "initialkey"),
    ("TMOO", "mood"),
    ("TLAN", "language"),
    ("TSRC", "isrc"),
    ("TSSE", "encodingsettings"),
    ("TENC", "encodedby"),
    ("TCOP", "copyright"),
    ("TSOT", "titlesort"),
    ("TSOP", "artistsort"),
    ("TSOA", "albumsort"),
    ("TSO2", "albumartistsort"),
    ("TCMP", "compilation"),
];

pub(crate) const COMMENT_FIELD: &str = "comment";
pub(crate) const LYRICS_FIELD: &str = "lyrics";
pub(crate) const PICTURE_FIELD: &str = "picture";

/// Where a field name is stored inside an ID3v2 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameTarget<'a> {
    /// A plain text frame with this ID.
    Text(&'a str),
    /// The `COMM` frame without a description.
    Comment,
    /// The `USLT` frame without a description.
    Lyrics,
    /// The front cover `APIC` frame.
    Picture,
    /// A `TXXX` frame with this description.
    UserText(&'a str),
}

/// Field name for a text frame ID.
///
/// Returns `None` for frames that are not plain text frames.
pub(crate) fn field_for_frame(id: &str) -> Option<&str> {
    if id == "TXXX" || !id.starts_with('T') {
        return None;
    }
    Some(
        TEXT_FRAMES
            .iter()
            .find(|(frame, _)| *frame == id)
            .map_or(id, |&(_, field)| field),
    )
}

/// Frame that stores a field name.
pub(crate) fn frame_for_field(name: &str) -> FrameTarget<'_> {
    if name.eq_ignore_ascii_case(COMMENT_FIELD) {
        return FrameTarget::Comment;
    }
    if name.eq_ignore_ascii_case(LYRICS_FIELD) {
        return FrameTarget::Lyrics;
    }
    if name.eq_ignore_ascii_case(PICTURE_FIELD) {
        return FrameTarget::Picture;
    }
    // TDRC is listed first, so "year" writes the v2.4 date frame
    if let Some(&(frame, _)) = TEXT_FRAMES
        .iter()
        .find(|(_, field)| field.eq_ignore_ascii_case(name))
    {
        return FrameTarget::Text(frame);
    }
    if is_raw_text_frame_id(name) {
        return FrameTarget::Text(name);
    }
    FrameTarget::UserText(name)
}

fn is_raw_text_frame_id(name: &str) -> bool {
    name.len() == 4
        && name != "TXXX"
        && name.starts_with('T')
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_frames_round_trip() {
        assert_eq!(field_for_frame("TPE1"), Some("artist"));
        assert_eq!(frame_for_field("artist"), FrameTarget::Text("TPE1"));
        assert_eq!(frame_for_field("Genre"), FrameTarget::Text("TCON"));
    }

    #[test]
    fn test_year_prefers_tdrc() {
        assert_eq!(field_for_frame("TYER"), Some("year"));
        assert_eq!(frame_for_field("year"), FrameTarget::Text("TDRC"));
    }

    #[test]
    fn test_unknown_text_frame_keeps_id() {
        assert_eq!(field_for_frame("TOPE"), Some("TOPE"));
        assert_eq!(frame_for_field("TOPE"), FrameTarget::Text("TOPE"));
    }

    #[test]
    fn test_non_text_frames() {
        assert_eq!(field_for_frame("TXXX"), None);
        assert_eq!(field_for_frame("APIC"), None);
        assert_eq!(frame_for_field("Comment"), FrameTarget::Comment);
        assert_eq!(frame_for_field("picture"), FrameTarget::Picture);
    }

    #[test]
    fn test_other_names_become_user_text() {
        assert_eq!(
            frame_for_field("MusicBrainz Album Id"),
            FrameTarget::UserText("MusicBrainz Album Id")
        );
        assert_eq!(frame_for_field("TXXX"), FrameTarget::UserText("TXXX"));
        assert_eq!(frame_for_field("tope"), FrameTarget::UserText("tope"));
    }
}
