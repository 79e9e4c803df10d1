//! [`StorageRecord`] → document decoding.
//!
//! Decoding runs in two passes. Pass 1 walks the target schema and collects
//! every present field into a name-keyed intermediate map, opening encrypted
//! fields on the way. Pass 2 lays that map over the serialized default document
//! and deserializes the result, so absent fields keep their default values.

use chrono::SecondsFormat;
use common::{CodecError, Identifier, StorageRecord, StorageValue};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::crypto::cipher::open;
use crate::document::Document;
use crate::schema::{FieldKind, Schema};

use super::json_kind;

/// Decode `record` into a `D`, opening every encrypted field with `key`.
///
/// All-or-nothing: on any error no document is produced.
///
/// # Errors
///
/// - [`CodecError::InvalidSchema`] if `D`'s schema fails validation.
/// - [`CodecError::TypeMismatch`] if a stored value disagrees with its declared
///   kind, including an encrypted field that does not hold a string.
/// - [`CodecError::MalformedCiphertext`] / [`CodecError::InvalidKeySize`] when a
///   ciphertext cannot be opened (a wrong key surfaces here).
/// - [`CodecError::StructuralDecode`] if the final assignment onto `D` fails.
pub fn decode<D: Document>(record: &StorageRecord, key: &[u8]) -> Result<D, CodecError> {
    let schema = D::schema();
    schema.validate()?;

    // Pass 1
    let fields = collect_fields(schema, record, key)?;
    let present = fields.len();

    // Pass 2
    let mut tree = serde_json::to_value(D::default())
        .map_err(|e| CodecError::StructuralDecode(e.to_string()))?;
    overlay(&mut tree, Value::Object(fields));
    let doc: D = serde_json::from_value(tree).map_err(|e| CodecError::StructuralDecode(e.to_string()))?;

    debug!(schema = schema.name(), fields = present, "decoded document");
    Ok(doc)
}

fn collect_fields(
    schema: &Schema,
    record: &StorageRecord,
    key: &[u8],
) -> Result<Map<String, Value>, CodecError> {
    let mut out = Map::new();
    for field in schema.fields() {
        let Some(stored) = record.get(field.storage_key()) else {
            continue;
        };

        let value = if field.is_encrypted() {
            let text = stored
                .as_str()
                .ok_or_else(|| CodecError::mismatch(field.name(), "ciphertext string", stored.kind_name()))?;
            let plaintext = open(key, text)?;
            let parsed: Value = serde_json::from_slice(&plaintext).map_err(|_| {
                CodecError::MalformedCiphertext(format!(
                    "decrypted value of `{}` is not a valid intermediate representation",
                    field.name()
                ))
            })?;
            check_shape(field.name(), field.kind(), parsed)?
        } else {
            from_storage(field.name(), field.kind(), stored, key)?
        };
        out.insert(field.name().to_owned(), value);
    }
    Ok(out)
}

/// Verify a decrypted intermediate value against the declared kind.
fn check_shape(field: &str, kind: &FieldKind, value: Value) -> Result<Value, CodecError> {
    if value.is_null() {
        return Ok(value);
    }

    let fits = match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Integer => value.is_i64(),
        FieldKind::Float => value.is_number(),
        FieldKind::Bool => value.is_boolean(),
        FieldKind::Identifier => value.as_str().is_some_and(|s| s.parse::<Identifier>().is_ok()),
        FieldKind::Timestamp => value
            .as_str()
            .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
        // The whole nested value was serialized as one unit; its own field
        // names are already the ones the nested type deserializes from.
        FieldKind::Document(_) => value.is_object(),
        FieldKind::Sequence(element) => {
            return match value {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| check_shape(field, element, item))
                    .collect::<Result<_, _>>()
                    .map(Value::Array),
                other => Err(CodecError::mismatch(field, kind.name(), json_kind(&other))),
            };
        }
    };

    if fits {
        Ok(value)
    } else {
        Err(CodecError::mismatch(field, kind.name(), json_kind(&value)))
    }
}

/// Convert one plain stored value back into the intermediate form.
fn from_storage(
    field: &str,
    kind: &FieldKind,
    stored: &StorageValue,
    key: &[u8],
) -> Result<Value, CodecError> {
    let mismatch = || CodecError::mismatch(field, kind.name(), stored.kind_name());

    let value = match (kind, stored) {
        // Absent marker; an invalid identifier decodes from this.
        (_, StorageValue::Null) => Value::Null,
        (FieldKind::String, StorageValue::String(s)) => Value::String(s.clone()),
        (FieldKind::Integer, StorageValue::Int(n)) => Value::from(*n),
        (FieldKind::Float, StorageValue::Float(f)) => {
            Value::Number(Number::from_f64(*f).ok_or_else(mismatch)?)
        }
        (FieldKind::Float, StorageValue::Int(n)) => Value::from(*n as f64),
        (FieldKind::Bool, StorageValue::Bool(b)) => Value::Bool(*b),
        (FieldKind::Identifier, StorageValue::Id(id)) => Value::String(id.to_hex()),
        (FieldKind::Timestamp, StorageValue::DateTime(at)) => {
            Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        (FieldKind::Document(nested), StorageValue::Record(inner)) => {
            Value::Object(collect_fields(nested(), inner, key)?)
        }
        (FieldKind::Sequence(element), StorageValue::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| from_storage(field, element, item, key))
                .collect::<Result<_, _>>()?,
        ),
        _ => return Err(mismatch()),
    };
    Ok(value)
}

/// Lay `patch` over `base`, merging nested objects key by key.
fn overlay(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (k, v) in patch {
                match base.get_mut(&k) {
                    Some(existing) => overlay(existing, v),
                    None => {
                        base.insert(k, v);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overlay_merges_nested_objects() {
        let mut base = json!({"A": {"B": "default", "C": 1}, "D": [1, 2]});
        overlay(&mut base, json!({"A": {"B": "x"}, "D": [3]}));
        assert_eq!(base, json!({"A": {"B": "x", "C": 1}, "D": [3]}));
    }

    #[test]
    fn overlay_replaces_null_default() {
        let mut base = json!({"Home": null});
        overlay(&mut base, json!({"Home": {"Street": "Elm"}}));
        assert_eq!(base, json!({"Home": {"Street": "Elm"}}));
    }

    #[test]
    fn check_shape_accepts_matching_kinds() {
        assert!(check_shape("f", &FieldKind::String, json!("x")).is_ok());
        assert!(check_shape("f", &FieldKind::Integer, json!(3)).is_ok());
        assert!(check_shape("f", &FieldKind::Float, json!(3)).is_ok());
        assert!(check_shape("f", &FieldKind::Bool, json!(true)).is_ok());
        assert!(check_shape("f", &FieldKind::Integer, Value::Null).is_ok());
        assert!(check_shape("f", &FieldKind::sequence(FieldKind::String), json!(["a", "b"])).is_ok());
    }

    #[test]
    fn check_shape_rejects_mismatches() {
        let err = check_shape("Age", &FieldKind::Integer, json!("thirty")).unwrap_err();
        assert!(matches!(
            err,
            CodecError::TypeMismatch { expected: "integer", found: "string", .. }
        ));
        assert!(check_shape("f", &FieldKind::Integer, json!(1.5)).is_err());
        assert!(check_shape("f", &FieldKind::sequence(FieldKind::Bool), json!([true, 1])).is_err());
        assert!(check_shape("f", &FieldKind::Identifier, json!("nope")).is_err());
    }

    #[test]
    fn from_storage_coerces_int_to_float() {
        let v = from_storage("f", &FieldKind::Float, &StorageValue::Int(2), &[]).unwrap();
        assert_eq!(v.as_f64(), Some(2.0));
    }

    #[test]
    fn from_storage_rejects_wrong_shape() {
        let err = from_storage("Age", &FieldKind::Integer, &StorageValue::from("x"), &[]).unwrap_err();
        assert_eq!(err.code(), "type_mismatch");
    }
}
