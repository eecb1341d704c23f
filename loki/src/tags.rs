//! Label sets attached to every pushed record

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single tag value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(b) => write!(f, "{b}"),
            TagValue::Int(i) => write!(f, "{i}"),
            TagValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Str(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Str(s)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        TagValue::Int(i)
    }
}

impl From<u64> for TagValue {
    fn from(i: u64) -> Self {
        TagValue::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        TagValue::Bool(b)
    }
}

/// Mapping of tag name to value; later writes override earlier ones
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, TagValue>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, replacing any previous value for the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Fluent variant of [`TagSet::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge `other` on top of this set; `other` wins on collisions
    pub fn merge(&mut self, other: &TagSet) -> &mut Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TagValue)> {
        self.0.iter()
    }

    /// Render as Loki stream labels: sanitized names, string values.
    /// Tags whose name sanitizes to nothing are skipped.
    pub fn to_labels(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(name, value)| {
                let label = sanitize_label(name);
                (!label.is_empty()).then(|| (label, value.to_string()))
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for TagSet
where
    K: Into<String>,
    V: Into<TagValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Normalize a tag name into a valid Loki label name.
///
/// Quotes are removed; space, `.` and `-` become `_`; anything else that is
/// not ASCII alphanumeric or `_` is dropped.
pub fn sanitize_label(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            '\'' | '"' => None,
            ' ' | '.' | '-' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}
