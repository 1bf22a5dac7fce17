//! Tag field values as seen in audio files.
//!
//! A file's tags are an ordered list of named fields. Each field holds a
//! text scalar, an integer, a list of text scalars, or raw bytes (cover art).

/// The value of a single tag field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// A single text value.
    Text(String),
    /// A numeric value (track numbers, years) as reported by the codec.
    Integer(i64),
    /// A multi-valued field, e.g. several genres.
    List(Vec<String>),
    /// Raw binary payload, e.g. embedded cover art.
    Binary(Vec<u8>),
}

impl TagValue {
    /// Text scalars of this value, in order.
    ///
    /// Binary values have no text form and yield an empty list.
    #[must_use]
    pub fn text_values(&self) -> Vec<String> {
        match self {
            Self::Text(s) => vec![s.clone()],
            Self::Integer(n) => vec![n.to_string()],
            Self::List(items) => items.clone(),
            Self::Binary(_) => Vec::new(),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for TagValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for TagValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(String::from).collect())
    }
}

/// An ordered mapping from field name to value.
///
/// Lookups ignore ASCII case, matching how field names become columns.
/// Insertion order is preserved so imports add columns in the order a
/// file lists its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    fields: Vec<(String, TagValue)>,
}

impl TagMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Get a field's value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.position(name).map(|i| &self.fields[i].1)
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set a field, replacing any existing value under the same name.
    ///
    /// A replaced field keeps its position and original casing.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TagValue>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.fields[i].1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<TagValue> {
        self.position(name).map(|i| self.fields.remove(i).1)
    }

    /// Iterate over fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<TagValue>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
