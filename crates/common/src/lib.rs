//! Common types and errors shared across `docseal` crates.

pub mod error;
pub mod identifier;
pub mod record;

pub use error::CodecError;
pub use identifier::Identifier;
pub use record::{StorageRecord, StorageValue};
