//! Field descriptors: the static per-type metadata the codec walks.

use std::fmt;

use crate::document::Document;

use super::Schema;

/// Accessor for a nested document type's schema.
pub type SchemaRef = fn() -> &'static Schema;

/// Declared kind of a document field.
#[derive(Clone)]
pub enum FieldKind {
    /// UTF-8 text.
    String,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point.
    Float,
    Bool,
    /// A 12-byte [`common::Identifier`]; invalid ids are stored as `Null`.
    Identifier,
    /// A UTC instant, stored as the store's native time value rather than as a
    /// nested document.
    Timestamp,
    /// A nested document with its own schema.
    Document(SchemaRef),
    /// A homogeneous sequence of elements of the given kind.
    Sequence(Box<FieldKind>),
}

impl FieldKind {
    /// Kind for a field holding the nested document type `D`.
    pub fn document<D: Document>() -> Self {
        FieldKind::Document(D::schema)
    }

    /// Kind for a sequence of `element`.
    pub fn sequence(element: FieldKind) -> Self {
        FieldKind::Sequence(Box::new(element))
    }

    /// The kind name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Identifier => "identifier",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Document(_) => "document",
            FieldKind::Sequence(_) => "sequence",
        }
    }
}

// Nested schemas may be cyclic; compare and print them by identity and name only.
impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldKind::Document(a), FieldKind::Document(b)) => std::ptr::eq(a(), b()),
            (FieldKind::Sequence(a), FieldKind::Sequence(b)) => a == b,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Document(schema) => write!(f, "Document({})", schema().name()),
            FieldKind::Sequence(element) => write!(f, "Sequence({element:?})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Metadata for one document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    storage_key: String,
    encrypted: bool,
}

impl FieldDescriptor {
    /// Describe the field the document serializes under `name`.
    ///
    /// The storage key defaults to `name` with its first character lowercased.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            storage_key: lower_initial(name),
            encrypted: false,
        }
    }

    /// Override the storage key. An empty override keeps the derived key.
    pub fn storage_key_override(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.is_empty() {
            self.storage_key = key;
        }
        self
    }

    /// Mark the field as stored encrypted.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Key the field is written under in a [`common::StorageRecord`].
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }
}

/// Lowercase the first character of `name`, leaving the rest untouched.
pub fn lower_initial(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_initial_only_touches_first_char() {
        assert_eq!(lower_initial("Name"), "name");
        assert_eq!(lower_initial("CreatedAt"), "createdAt");
        assert_eq!(lower_initial("already"), "already");
        assert_eq!(lower_initial("ÉTAT"), "éTAT");
        assert_eq!(lower_initial(""), "");
    }

    #[test]
    fn default_and_explicit_storage_keys() {
        let f = FieldDescriptor::new("ZipCode", FieldKind::String);
        assert_eq!(f.storage_key(), "zipCode");
        assert!(!f.is_encrypted());

        let f = FieldDescriptor::new("Id", FieldKind::Identifier).storage_key_override("_id");
        assert_eq!(f.storage_key(), "_id");
    }

    #[test]
    fn empty_override_keeps_derived_key() {
        let f = FieldDescriptor::new("ZipCode", FieldKind::String).storage_key_override("");
        assert_eq!(f.storage_key(), "zipCode");
    }

    #[test]
    fn encrypted_flag() {
        let f = FieldDescriptor::new("Ssn", FieldKind::String).encrypted();
        assert!(f.is_encrypted());
        assert_eq!(f.kind(), &FieldKind::String);
    }

    #[test]
    fn kind_equality_and_names() {
        let seq = FieldKind::sequence(FieldKind::Integer);
        assert_eq!(seq, FieldKind::sequence(FieldKind::Integer));
        assert_ne!(seq, FieldKind::sequence(FieldKind::Float));
        assert_eq!(seq.name(), "sequence");
        assert_eq!(format!("{seq:?}"), "Sequence(integer)");
    }
}
