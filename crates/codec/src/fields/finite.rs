//! Pre-pass that finds non-finite floats before the document is serialized.
//!
//! `serde_json` writes `NaN` and `±inf` as `null`, which cannot be told apart
//! from an absent `Option` afterwards. Walking the document once with this
//! serializer reports the field path of the first such value.

use std::fmt::Display;

use serde::ser::{self, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub(super) enum FloatCheckError {
    #[error("non-finite float at `{0}`")]
    NonFinite(String),

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for FloatCheckError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Walk `value` and fail on the first `NaN` or infinite float.
pub(super) fn check_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), FloatCheckError> {
    value.serialize(&mut FloatCheck { path: Vec::new() })
}

struct FloatCheck {
    path: Vec<&'static str>,
}

impl FloatCheck {
    fn float(&self, v: f64) -> Result<(), FloatCheckError> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(FloatCheckError::NonFinite(self.path.join(".")))
        }
    }

    fn nested<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), FloatCheckError> {
        self.path.push(key);
        value.serialize(&mut *self)?;
        self.path.pop();
        Ok(())
    }
}

type Res = Result<(), FloatCheckError>;

impl<'a> Serializer for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Res {
        Ok(())
    }
    fn serialize_i8(self, _: i8) -> Res {
        Ok(())
    }
    fn serialize_i16(self, _: i16) -> Res {
        Ok(())
    }
    fn serialize_i32(self, _: i32) -> Res {
        Ok(())
    }
    fn serialize_i64(self, _: i64) -> Res {
        Ok(())
    }
    fn serialize_i128(self, _: i128) -> Res {
        Ok(())
    }
    fn serialize_u8(self, _: u8) -> Res {
        Ok(())
    }
    fn serialize_u16(self, _: u16) -> Res {
        Ok(())
    }
    fn serialize_u32(self, _: u32) -> Res {
        Ok(())
    }
    fn serialize_u64(self, _: u64) -> Res {
        Ok(())
    }
    fn serialize_u128(self, _: u128) -> Res {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Res {
        self.float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Res {
        self.float(v)
    }

    fn serialize_char(self, _: char) -> Res {
        Ok(())
    }
    fn serialize_str(self, _: &str) -> Res {
        Ok(())
    }
    fn serialize_bytes(self, _: &[u8]) -> Res {
        Ok(())
    }
    fn serialize_none(self) -> Res {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Res {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Res {
        Ok(())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Res {
        Ok(())
    }
    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Res {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _: &'static str, value: &T) -> Res {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
        value: &T,
    ) -> Res {
        self.nested(variant, value)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
    fn serialize_tuple(self, _: usize) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
}

impl<'a> ser::SerializeSeq for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Res {
        value.serialize(&mut **self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Res {
        value.serialize(&mut **self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Res {
        value.serialize(&mut **self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Res {
        value.serialize(&mut **self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Res {
        key.serialize(&mut **self)
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Res {
        value.serialize(&mut **self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Res {
        self.nested(key, value)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Res {
        self.nested(key, value)
    }
    fn end(self) -> Res {
        Ok(())
    }
}
