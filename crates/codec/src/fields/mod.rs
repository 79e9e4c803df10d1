//! Schema-driven document encoding and decoding.
//!
//! [`encode`] runs immediately before a write and [`decode`] immediately after
//! a read. They are the only entry points the persistence layer uses; the cipher
//! is never called directly by it.
//!
//! Both functions are pure: no I/O, no shared mutable state, safe to call
//! concurrently with the same key.

mod decode;
mod encode;
mod finite;

pub use decode::decode;
pub use encode::encode;

use common::{CodecError, StorageRecord};
use serde_json::Value;

use crate::document::Document;
use crate::key::FieldKey;

/// Encoder/decoder bound to one caller-supplied key.
#[derive(Clone, Debug)]
pub struct FieldCodec {
    key: FieldKey,
}

impl FieldCodec {
    pub fn new(key: FieldKey) -> Self {
        Self { key }
    }

    /// See [`encode`].
    pub fn encode<D: Document>(&self, doc: &D) -> Result<StorageRecord, CodecError> {
        encode(doc, self.key.as_bytes())
    }

    /// See [`decode`].
    pub fn decode<D: Document>(&self, record: &StorageRecord) -> Result<D, CodecError> {
        decode(record, self.key.as_bytes())
    }
}

/// Shape name of an intermediate value, for error messages.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "document",
    }
}
