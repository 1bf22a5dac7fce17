//! Conversion between tag values and stored cells.
//!
//! | Tag value | Stored as |
//! |-----------|-----------|
//! | text      | TEXT, unchanged |
//! | integer   | TEXT, decimal |
//! | list      | TEXT, elements joined with [`LIST_SEPARATOR`] |
//! | binary    | BLOB |
//! | file path | BLOB of the path's bytes |
//!
//! Lists are stored lossily when an element itself contains the separator:
//! it is split into extra elements on the way back.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;

use crate::model::TagValue;
use crate::storage::schema::PATH_COLUMN;

/// Separator between list elements in a stored TEXT cell: two backslashes.
pub const LIST_SEPARATOR: &str = "\\\\";

/// Returns true if a field name can be stored as a column.
///
/// Only 7-bit ASCII names are accepted.
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty() && name.is_ascii()
}

/// Encode a field for storage.
///
/// The path column always stores `file_path`, whatever the tag says.
#[must_use]
pub fn encode(field_name: &str, value: &TagValue, file_path: &Path) -> Value {
    if field_name == PATH_COLUMN {
        path_to_value(file_path)
    } else {
        encode_value(value)
    }
}

/// Encode a tag value into its stored form.
#[must_use]
pub fn encode_value(value: &TagValue) -> Value {
    match value {
        TagValue::Text(s) => Value::Text(s.clone()),
        TagValue::Integer(n) => Value::Text(n.to_string()),
        TagValue::List(items) => Value::Text(items.join(LIST_SEPARATOR)),
        TagValue::Binary(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Decode a stored cell. Returns `None` for NULL and empty cells.
#[must_use]
pub fn decode(stored: &Value) -> Option<TagValue> {
    match stored {
        Value::Null => None,
        Value::Text(s) if s.is_empty() => None,
        Value::Text(s) if s.contains(LIST_SEPARATOR) => {
            let items: Vec<String> = s
                .split(LIST_SEPARATOR)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect();
            (!items.is_empty()).then_some(TagValue::List(items))
        }
        Value::Text(s) => Some(TagValue::Text(s.clone())),
        Value::Blob(bytes) if bytes.is_empty() => None,
        Value::Blob(bytes) => Some(TagValue::Binary(bytes.clone())),
        Value::Integer(n) => Some(TagValue::Text(n.to_string())),
        Value::Real(f) => Some(TagValue::Text(f.to_string())),
    }
}

/// Store a path as raw bytes so non-UTF-8 names survive.
#[must_use]
pub fn path_to_value(path: &Path) -> Value {
    Value::Blob(path.as_os_str().as_encoded_bytes().to_vec())
}

/// Store an optional path component, NULL when absent.
#[must_use]
pub fn os_str_to_value(part: Option<&OsStr>) -> Value {
    part.map_or(Value::Null, |s| Value::Blob(s.as_encoded_bytes().to_vec()))
}

/// Recover a path from a stored cell (BLOB or TEXT).
#[must_use]
pub fn value_to_path(stored: &Value) -> Option<PathBuf> {
    match stored {
        Value::Blob(bytes) if !bytes.is_empty() => Some(bytes_to_path(bytes)),
        Value::Text(s) if !s.is_empty() => Some(PathBuf::from(s)),
        _ => None,
    }
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
