//! Generic storage representation exchanged with the persistence layer.
//!
//! A [`StorageRecord`] is what is physically written and read back: a mapping
//! from storage key to an untyped [`StorageValue`]. Key order is irrelevant.

use std::collections::{btree_map, BTreeMap};

use chrono::{DateTime, Utc};

use crate::identifier::Identifier;

/// An untyped stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageValue {
    /// Explicit absent marker (invalid identifiers, `None` values).
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Plain text or ciphertext. The storage layer cannot tell them apart.
    String(String),
    Id(Identifier),
    /// The store's native time representation.
    DateTime(DateTime<Utc>),
    Array(Vec<StorageValue>),
    Record(StorageRecord),
}

impl StorageValue {
    /// Name of this value's shape, used in type-mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StorageValue::Null => "null",
            StorageValue::Bool(_) => "bool",
            StorageValue::Int(_) => "integer",
            StorageValue::Float(_) => "float",
            StorageValue::String(_) => "string",
            StorageValue::Id(_) => "identifier",
            StorageValue::DateTime(_) => "timestamp",
            StorageValue::Array(_) => "sequence",
            StorageValue::Record(_) => "document",
        }
    }

    /// Borrow the text if this is a [`StorageValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StorageValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested record if this is a [`StorageValue::Record`].
    pub fn as_record(&self) -> Option<&StorageRecord> {
        match self {
            StorageValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StorageValue::Null)
    }
}

impl From<&str> for StorageValue {
    fn from(s: &str) -> Self {
        StorageValue::String(s.to_owned())
    }
}

impl From<String> for StorageValue {
    fn from(s: String) -> Self {
        StorageValue::String(s)
    }
}

impl From<i64> for StorageValue {
    fn from(n: i64) -> Self {
        StorageValue::Int(n)
    }
}

impl From<f64> for StorageValue {
    fn from(n: f64) -> Self {
        StorageValue::Float(n)
    }
}

impl From<bool> for StorageValue {
    fn from(b: bool) -> Self {
        StorageValue::Bool(b)
    }
}

impl From<StorageRecord> for StorageValue {
    fn from(r: StorageRecord) -> Self {
        StorageValue::Record(r)
    }
}

/// Storage-key to value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageRecord {
    entries: BTreeMap<String, StorageValue>,
}

impl StorageRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&StorageValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, returning the previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StorageValue>) -> Option<StorageValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<StorageValue> {
        self.entries.remove(key)
    }

    /// Fold `other` into this record. Keys present in both take `other`'s value.
    ///
    /// This is how a persistence collaborator merges encode output into the
    /// record it is about to write.
    pub fn merge(&mut self, other: StorageRecord) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, StorageValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, StorageValue)> for StorageRecord {
    fn from_iter<I: IntoIterator<Item = (String, StorageValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for StorageRecord {
    type Item = (String, StorageValue);
    type IntoIter = btree_map::IntoIter<String, StorageValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a StorageRecord {
    type Item = (&'a String, &'a StorageValue);
    type IntoIter = btree_map::Iter<'a, String, StorageValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut r = StorageRecord::new();
        assert!(r.is_empty());
        r.insert("name", "Alice");
        r.insert("age", 30i64);
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("name").and_then(StorageValue::as_str), Some("Alice"));
        assert_eq!(r.get("age"), Some(&StorageValue::Int(30)));
        assert!(r.get("missing").is_none());
    }

    #[test]
    fn merge_overwrites_shared_keys() {
        let mut persisted = StorageRecord::new();
        persisted.insert("_id", StorageValue::Id(Identifier::generate()));
        persisted.insert("name", "old");

        let mut encoded = StorageRecord::new();
        encoded.insert("name", "new");
        encoded.insert("age", 3i64);

        persisted.merge(encoded);
        assert_eq!(persisted.len(), 3);
        assert_eq!(persisted.get("name").and_then(StorageValue::as_str), Some("new"));
        assert!(persisted.contains_key("_id"));
    }

    #[test]
    fn kind_names() {
        assert_eq!(StorageValue::Null.kind_name(), "null");
        assert_eq!(StorageValue::from(1.5).kind_name(), "float");
        assert_eq!(StorageValue::Record(StorageRecord::new()).kind_name(), "document");
        assert_eq!(StorageValue::Id(Identifier::INVALID).kind_name(), "identifier");
    }

    #[test]
    fn collect_from_pairs() {
        let r: StorageRecord = vec![("a".to_string(), StorageValue::Bool(true))]
            .into_iter()
            .collect();
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["a"]);
    }
}
