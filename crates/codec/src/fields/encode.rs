//! Document → [`StorageRecord`] encoding.

use chrono::{DateTime, Utc};
use common::{CodecError, Identifier, StorageRecord, StorageValue};
use serde_json::{Map, Value};
use tracing::debug;

use crate::crypto::cipher::seal;
use crate::document::Document;
use crate::schema::{FieldKind, Schema};

use super::finite::{check_finite, FloatCheckError};
use super::json_kind;

/// Encode `doc` into a storage record, sealing every encrypted field with `key`.
///
/// Fields are visited in declaration order. The first failure aborts the
/// whole call; no partially encoded record is ever returned.
///
/// # Errors
///
/// - [`CodecError::InvalidSchema`] if the document schema fails validation.
/// - [`CodecError::UnsupportedFieldKind`] if the document cannot be serialized,
///   including any `NaN` or infinite float.
/// - [`CodecError::TypeMismatch`] if a value disagrees with its declared kind.
/// - [`CodecError::InvalidKeySize`] / [`CodecError::Rng`] from sealing.
pub fn encode<D: Document>(doc: &D, key: &[u8]) -> Result<StorageRecord, CodecError> {
    let schema = D::schema();
    schema.validate()?;

    check_finite(doc).map_err(|e| match e {
        FloatCheckError::NonFinite(path) => CodecError::UnsupportedFieldKind {
            field: path,
            reason: "non-finite float".to_owned(),
        },
        FloatCheckError::Custom(reason) => CodecError::UnsupportedFieldKind {
            field: schema.name().to_owned(),
            reason,
        },
    })?;
    let tree = serde_json::to_value(doc).map_err(|e| CodecError::UnsupportedFieldKind {
        field: schema.name().to_owned(),
        reason: e.to_string(),
    })?;
    let fields = match tree {
        Value::Object(fields) => fields,
        other => return Err(CodecError::mismatch(schema.name(), "document", json_kind(&other))),
    };

    let record = encode_fields(schema, &fields, key)?;
    debug!(schema = schema.name(), fields = record.len(), "encoded document");
    Ok(record)
}

fn encode_fields(
    schema: &Schema,
    fields: &Map<String, Value>,
    key: &[u8],
) -> Result<StorageRecord, CodecError> {
    let mut record = StorageRecord::new();
    for field in schema.fields() {
        // Skipped during serialization: nothing to store.
        let Some(value) = fields.get(field.name()) else {
            continue;
        };

        let stored = if field.is_encrypted() {
            let plaintext =
                serde_json::to_vec(value).map_err(|e| CodecError::UnsupportedFieldKind {
                    field: field.name().to_owned(),
                    reason: e.to_string(),
                })?;
            StorageValue::String(seal(key, &plaintext)?)
        } else {
            to_storage(field.name(), field.kind(), value, key)?
        };
        record.insert(field.storage_key(), stored);
    }
    Ok(record)
}

/// Convert one plain (non-encrypted) value into its stored form.
fn to_storage(
    field: &str,
    kind: &FieldKind,
    value: &Value,
    key: &[u8],
) -> Result<StorageValue, CodecError> {
    if value.is_null() {
        return Ok(StorageValue::Null);
    }
    let mismatch = || CodecError::mismatch(field, kind.name(), json_kind(value));

    let stored = match kind {
        FieldKind::String => StorageValue::String(value.as_str().ok_or_else(mismatch)?.to_owned()),
        FieldKind::Integer => StorageValue::Int(value.as_i64().ok_or_else(mismatch)?),
        FieldKind::Float => StorageValue::Float(value.as_f64().ok_or_else(mismatch)?),
        FieldKind::Bool => StorageValue::Bool(value.as_bool().ok_or_else(mismatch)?),
        FieldKind::Identifier => {
            let id: Identifier = value
                .as_str()
                .and_then(|s| s.parse().ok())
                .ok_or_else(mismatch)?;
            if id.is_valid() {
                StorageValue::Id(id)
            } else {
                StorageValue::Null
            }
        }
        FieldKind::Timestamp => {
            let at = value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .ok_or_else(mismatch)?;
            StorageValue::DateTime(at.with_timezone(&Utc))
        }
        FieldKind::Document(nested) => {
            let object = value.as_object().ok_or_else(mismatch)?;
            StorageValue::Record(encode_fields(nested(), object, key)?)
        }
        FieldKind::Sequence(element) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            StorageValue::Array(
                items
                    .iter()
                    .map(|item| to_storage(field, element, item, key))
                    .collect::<Result<_, _>>()?,
            )
        }
    };
    Ok(stored)
}
