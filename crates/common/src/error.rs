//! Common error types shared across crates.

use thiserror::Error;

/// Top-level codec error type.
///
/// Every variant is fatal for the encode or decode call that produced it:
/// callers never receive a half-encoded record or a half-populated document.
/// Messages never include plaintext or key material.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Key material is not 16, 24, or 32 bytes long.
    #[error("invalid key size: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeySize(usize),

    /// A ciphertext could not be decoded: bad text encoding, shorter than one
    /// cipher block, or an undecodable payload after decryption (wrong key).
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// The declared kind of a field disagrees with the shape of its value.
    #[error("type mismatch for field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value could not be represented in the intermediate form.
    #[error("unsupported value for field `{field}`: {reason}")]
    UnsupportedFieldKind { field: String, reason: String },

    /// The final type-directed assignment onto the document failed.
    #[error("structural decode error: {0}")]
    StructuralDecode(String),

    /// The document schema is not usable (duplicate keys, cycles, ...).
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The OS random source could not produce an initialization vector.
    #[error("random source unavailable: {0}")]
    Rng(String),
}

impl CodecError {
    /// Short machine-readable error code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::InvalidKeySize(_) => "invalid_key_size",
            CodecError::MalformedCiphertext(_) => "malformed_ciphertext",
            CodecError::TypeMismatch { .. } => "type_mismatch",
            CodecError::UnsupportedFieldKind { .. } => "unsupported_field_kind",
            CodecError::StructuralDecode(_) => "structural_decode",
            CodecError::InvalidSchema(_) => "invalid_schema",
            CodecError::Rng(_) => "rng_unavailable",
        }
    }

    /// Shorthand for a [`CodecError::TypeMismatch`].
    pub fn mismatch(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        CodecError::TypeMismatch {
            field: field.into(),
            expected,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(CodecError::InvalidKeySize(7).code(), "invalid_key_size");
        assert_eq!(
            CodecError::MalformedCiphertext("x".into()).code(),
            "malformed_ciphertext"
        );
        assert_eq!(CodecError::mismatch("Age", "integer", "string").code(), "type_mismatch");
        assert_eq!(
            CodecError::UnsupportedFieldKind {
                field: "x".into(),
                reason: "y".into()
            }
            .code(),
            "unsupported_field_kind"
        );
        assert_eq!(CodecError::StructuralDecode("x".into()).code(), "structural_decode");
        assert_eq!(CodecError::InvalidSchema("x".into()).code(), "invalid_schema");
    }

    #[test]
    fn display_names_field_and_kinds() {
        let e = CodecError::mismatch("Age", "integer", "string");
        let msg = e.to_string();
        assert!(msg.contains("`Age`"));
        assert!(msg.contains("expected integer"));
        assert!(msg.contains("found string"));
    }

    #[test]
    fn display_includes_key_length() {
        assert!(CodecError::InvalidKeySize(15).to_string().contains("15"));
    }
}
