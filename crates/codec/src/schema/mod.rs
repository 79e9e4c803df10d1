//! Document schemas: per-type field descriptor tables.
//!
//! # Responsibilities
//!
//! - Describe each field of a document type once: name, declared kind,
//!   resolved storage key, and whether it is stored encrypted.
//! - Reject unusable schemas before the codec walks them: empty or duplicate
//!   field names, duplicate storage keys, and cyclic nesting.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** This module must not import anything from `crate::crypto`.
//! - A [`Schema`] is immutable once built; document types hand out `&'static` references.

pub mod descriptor;

pub use descriptor::{lower_initial, FieldDescriptor, FieldKind, SchemaRef};

use std::collections::HashSet;
use std::sync::OnceLock;

use common::CodecError;
use thiserror::Error;

/// Errors from schema validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema {0} has a field with an empty name")]
    EmptyFieldName(&'static str),

    #[error("schema {schema} declares field `{field}` more than once")]
    DuplicateField {
        schema: &'static str,
        field: &'static str,
    },

    #[error("schema {schema} maps more than one field to storage key `{key}`")]
    DuplicateStorageKey { schema: &'static str, key: String },

    #[error("schema {0} contains itself through nested fields")]
    Cyclic(&'static str),
}

impl From<SchemaError> for CodecError {
    fn from(e: SchemaError) -> Self {
        CodecError::InvalidSchema(e.to_string())
    }
}

/// The ordered field descriptor table of one document type.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    validated: OnceLock<Result<(), SchemaError>>,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl Schema {
    /// Start an empty schema for the document type called `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            validated: OnceLock::new(),
        }
    }

    /// Append a field. Declaration order is the order the codec walks.
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self.validated = OnceLock::new();
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a descriptor by field name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Check this schema and every schema nested beneath it.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, in declaration order.
    /// The outcome is computed on first call and reused afterwards.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validated
            .get_or_init(|| self.validate_at(&mut Vec::new()))
            .clone()
    }

    fn validate_at<'s>(&'s self, path: &mut Vec<&'s Schema>) -> Result<(), SchemaError> {
        if path.iter().any(|seen| std::ptr::eq(*seen, self)) {
            return Err(SchemaError::Cyclic(self.name));
        }

        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for field in &self.fields {
            if field.name().is_empty() {
                return Err(SchemaError::EmptyFieldName(self.name));
            }
            if !names.insert(field.name()) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name,
                    field: field.name(),
                });
            }
            if !keys.insert(field.storage_key()) {
                return Err(SchemaError::DuplicateStorageKey {
                    schema: self.name,
                    key: field.storage_key().to_owned(),
                });
            }
        }

        path.push(self);
        for field in &self.fields {
            if let Some(nested) = nested_schema(field.kind()) {
                nested.validate_at(path)?;
            }
        }
        path.pop();
        Ok(())
    }
}

/// The document schema a kind leads to, looking through sequences.
fn nested_schema(kind: &FieldKind) -> Option<&'static Schema> {
    match kind {
        FieldKind::Document(schema) => Some(schema()),
        FieldKind::Sequence(element) => nested_schema(element),
        _ => None,
    }
}
