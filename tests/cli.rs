//! Binary-level tests for the `tagdb` command.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tagdb() -> Command {
    let mut cmd = Command::cargo_bin("tagdb").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Write a small ID3v2.4 tag onto a file of junk audio bytes.
fn write_mp3(path: &Path, artist: &str, album: &str) {
    use id3::TagLike;

    fs::write(path, [0u8; 64]).unwrap();
    let mut tag = id3::Tag::new();
    tag.set_artist(artist);
    tag.set_album(album);
    tag.write_to_path(path, id3::Version::Id3v24).unwrap();
}

/// Write a FLAC stream with no audio frames and tag it with an artist.
fn write_flac(path: &Path, artist: &str) {
    use tagdb::model::TagValue;
    use tagdb::tags::{TagCodec, VorbisCodec};

    let mut bytes = b"fLaC".to_vec();
    bytes.extend_from_slice(&[0x80, 0x00, 0x00, 0x22]);
    bytes.extend_from_slice(&[0x10, 0x00, 0x10, 0x00]);
    bytes.extend_from_slice(&[0x00; 6]);
    bytes.extend_from_slice(&[0x0a, 0xc4, 0x42, 0xf0, 0x00, 0x00, 0x00, 0x00]);
    bytes.extend_from_slice(&[0x00; 16]);
    fs::write(path, bytes).unwrap();

    let mut file = VorbisCodec.open(path).unwrap();
    file.set("artist", &TagValue::from(artist)).unwrap();
    file.save().unwrap();
}

#[test]
fn test_rejects_unknown_action() {
    tagdb().args(["sync", "music.db", "music"]).assert().failure();
}

#[test]
fn test_requires_paths() {
    tagdb().arg("import").assert().failure();
}

#[test]
fn test_import_empty_dir_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("music.db");
    let music = temp_dir.path().join("music");
    fs::create_dir(&music).unwrap();

    tagdb()
        .arg("import")
        .arg(&db_path)
        .arg(&music)
        .assert()
        .success();

    assert!(db_path.exists());
}

#[test]
fn test_export_without_database_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("missing.db");

    let output = tagdb()
        .arg("export")
        .arg(&db_path)
        .arg(temp_dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Database not found"));
    assert!(!db_path.exists());
}

#[test]
fn test_import_json_summary() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("music.db");
    let music = temp_dir.path().join("music");
    fs::create_dir(&music).unwrap();
    write_mp3(&music.join("song.mp3"), "A", "B");
    fs::write(music.join("cover.jpg"), b"not audio").unwrap();

    let output = tagdb()
        .arg("import")
        .arg(&db_path)
        .arg(&music)
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["files_seen"], 2);
    assert_eq!(json["stats"]["imported"], 1);
    assert_eq!(json["stats"]["failed"], 1);
}

#[test]
fn test_edit_in_database_reaches_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("music.db");
    let music = temp_dir.path().join("music");
    fs::create_dir(&music).unwrap();
    let song = music.join("song.mp3");
    write_mp3(&song, "A", "B");

    tagdb()
        .arg("import")
        .arg(&db_path)
        .arg(&music)
        .assert()
        .success();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let artist: String = conn
        .query_row("SELECT artist FROM audio", [], |row| row.get(0))
        .unwrap();
    assert_eq!(artist, "A");
    conn.execute("UPDATE audio SET artist = 'C', album = NULL", [])
        .unwrap();
    drop(conn);

    tagdb()
        .arg("export")
        .arg(&db_path)
        .arg(&music)
        .arg("--log")
        .arg("INFO")
        .assert()
        .success();

    use id3::TagLike;
    let tag = id3::Tag::read_from_path(&song).unwrap();
    assert_eq!(tag.artist(), Some("C"));
    assert_eq!(tag.album(), None);
}

#[test]
fn test_dry_run_export_leaves_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("music.db");
    let music = temp_dir.path().join("music");
    fs::create_dir(&music).unwrap();
    let song = music.join("song.mp3");
    write_mp3(&song, "A", "B");

    tagdb()
        .arg("import")
        .arg(&db_path)
        .arg(&music)
        .assert()
        .success();
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute("UPDATE audio SET artist = 'C'", []).unwrap();
    drop(conn);

    tagdb()
        .arg("export")
        .arg(&db_path)
        .arg(&music)
        .arg("--dry-run")
        .assert()
        .success();

    use id3::TagLike;
    let tag = id3::Tag::read_from_path(&song).unwrap();
    assert_eq!(tag.artist(), Some("A"));
}

#[test]
fn test_mp3_and_flac_share_columns() {
    use tagdb::model::TagValue;
    use tagdb::tags::{TagCodec, VorbisCodec};

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("music.db");
    let music = temp_dir.path().join("music");
    fs::create_dir(&music).unwrap();
    write_mp3(&music.join("song.mp3"), "A", "B");
    let flac = music.join("track.flac");
    write_flac(&flac, "F");

    tagdb()
        .arg("import")
        .arg(&db_path)
        .arg(&music)
        .assert()
        .success();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let mut stmt = conn
        .prepare("SELECT artist FROM audio ORDER BY artist")
        .unwrap();
    let artists: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(artists, vec!["A", "F"]);
    conn.execute("UPDATE audio SET album = 'G' WHERE artist = 'F'", [])
        .unwrap();
    drop(stmt);
    drop(conn);

    tagdb()
        .arg("export")
        .arg(&db_path)
        .arg(&music)
        .assert()
        .success();

    let file = VorbisCodec.open(&flac).unwrap();
    assert_eq!(file.get("artist"), Some(TagValue::from("F")));
    assert_eq!(file.get("album"), Some(TagValue::from("G")));
}
