//! Transparent field-level encryption for stored documents.
//!
//! A document type declares its fields once in a [`Schema`]. [`encode`] turns a
//! document into a [`StorageRecord`] with every field marked encrypted replaced
//! by ciphertext; [`decode`] reverses it into a typed document.
//!
//! Key material is always supplied by the caller. This crate neither generates,
//! stores, nor rotates keys, and the cipher gives confidentiality only: there is
//! no tamper detection.

pub mod crypto;
pub mod document;
pub mod fields;
pub mod key;
pub mod schema;

pub use common::{CodecError, Identifier, StorageRecord, StorageValue};
pub use document::Document;
pub use fields::{decode, encode, FieldCodec};
pub use key::FieldKey;
pub use schema::{FieldDescriptor, FieldKind, Schema, SchemaError};
