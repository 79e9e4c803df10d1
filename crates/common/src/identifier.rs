//! Fixed-format 12-byte document identifiers.
//!
//! Layout of a generated identifier:
//!
//! ```text
//! | 4 bytes: unix seconds (BE) | 5 bytes: per-process random | 3 bytes: counter (BE) |
//! ```
//!
//! The all-zero value is the *invalid* identifier. It is what a freshly
//! defaulted document holds and what a stored `Null` decodes back to.

use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicU32, Ordering},
        OnceLock,
    },
};

use chrono::{DateTime, TimeZone, Utc};
use rand::RngCore;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Byte length of an identifier.
pub const ID_LEN: usize = 12;

/// Errors from parsing the text form of an [`Identifier`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier must be 24 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("identifier is not valid hex")]
    InvalidHex,
}

/// A document's unique id. May be invalid (all zero).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; ID_LEN]);

static COUNTER: AtomicU32 = AtomicU32::new(0);
static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();

impl Identifier {
    /// The invalid identifier.
    pub const INVALID: Identifier = Identifier([0u8; ID_LEN]);

    /// Generate a fresh, valid identifier.
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let unique = PROCESS_UNIQUE.get_or_init(|| {
            let mut b = [0u8; 5];
            rand::thread_rng().fill_bytes(&mut b);
            b
        });
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Wrap raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes.
    pub fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }

    /// `false` for the zero identifier.
    pub fn is_valid(&self) -> bool {
        self.0 != [0u8; ID_LEN]
    }

    /// Lowercase hex form. The invalid identifier renders as an empty string.
    pub fn to_hex(&self) -> String {
        if self.is_valid() {
            hex::encode(self.0)
        } else {
            String::new()
        }
    }

    /// Creation time embedded in the first four bytes.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if !self.is_valid() {
            return None;
        }
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(secs), 0).single()
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    /// Parses 24 hex characters. The empty string parses to the invalid identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::INVALID);
        }
        if s.len() != ID_LEN * 2 {
            return Err(IdentifierError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| IdentifierError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Identifier({})", self.to_hex())
        } else {
            f.write_str("Identifier(invalid)")
        }
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    /// Accepts the hex form, the empty string, or `null` (the stored absent marker).
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> de::Visitor<'de> for IdVisitor {
            type Value = Identifier;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 24-character hex identifier, an empty string, or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Identifier, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Identifier, E> {
                Ok(Identifier::INVALID)
            }

            fn visit_none<E: de::Error>(self) -> Result<Identifier, E> {
                Ok(Identifier::INVALID)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_invalid() {
        let id = Identifier::default();
        assert!(!id.is_valid());
        assert_eq!(id.to_hex(), "");
        assert_eq!(id.timestamp(), None);
    }

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = Identifier::generate();
        let b = Identifier::generate();
        assert!(a.is_valid());
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 24);
    }

    #[test]
    fn timestamp_reflects_generation_time() {
        let before = Utc::now().timestamp();
        let ts = Identifier::generate().timestamp().unwrap().timestamp();
        assert!(ts >= before - 1 && ts <= Utc::now().timestamp());
    }

    #[test]
    fn hex_parse() {
        let id: Identifier = "5f1d7a2b9c3e4d5f6a7b8c9d".parse().unwrap();
        assert!(id.is_valid());
        assert_eq!(id.to_string(), "5f1d7a2b9c3e4d5f6a7b8c9d");
        assert_eq!("".parse::<Identifier>().unwrap(), Identifier::INVALID);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!("abc".parse::<Identifier>(), Err(IdentifierError::InvalidLength(3)));
        assert_eq!(
            "zz1d7a2b9c3e4d5f6a7b8c9d".parse::<Identifier>(),
            Err(IdentifierError::InvalidHex)
        );
    }

    #[test]
    fn serde_accepts_null_as_invalid() {
        let id: Identifier = serde_json::from_value(serde_json::Value::Null).unwrap();
        assert_eq!(id, Identifier::INVALID);
        assert_eq!(serde_json::to_value(Identifier::INVALID).unwrap(), "");
    }

    #[test]
    fn debug_marks_invalid() {
        assert_eq!(format!("{:?}", Identifier::INVALID), "Identifier(invalid)");
    }
}
