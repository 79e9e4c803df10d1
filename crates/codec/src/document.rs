//! The [`Document`] trait: what a type must provide to pass through the codec.

use serde::{de::DeserializeOwned, Serialize};

use crate::schema::Schema;

/// A typed document with a static field descriptor table.
///
/// Descriptor names are the names the type serializes its fields under, so a
/// `#[serde(rename_all = "PascalCase")]` struct describes its fields as
/// `"Name"`, `"Age"`, and stores them under `"name"`, `"age"`.
///
/// `Default` supplies the value of every field absent from a stored record.
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Default)]
/// #[serde(rename_all = "PascalCase")]
/// struct Patient { name: String, age: i64 }
///
/// impl Document for Patient {
///     fn schema() -> &'static Schema {
///         static SCHEMA: OnceLock<Schema> = OnceLock::new();
///         SCHEMA.get_or_init(|| {
///             Schema::new("Patient")
///                 .field(FieldDescriptor::new("Name", FieldKind::String).encrypted())
///                 .field(FieldDescriptor::new("Age", FieldKind::Integer))
///         })
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Default {
    /// The descriptor table for this type, built once.
    fn schema() -> &'static Schema;
}
