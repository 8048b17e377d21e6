//! Pre-encode walk that refuses non-finite floats.
//!
//! `serde_json` writes NaN and infinities as `null`, which no float field can
//! decode again. [`check_finite`] drives a value's `Serialize` impl through a
//! serializer that produces nothing and fails on the first such float.

use std::fmt;

use serde::Serialize;
use serde::ser::{self, Serializer};

#[derive(Debug)]
pub struct NonFinite(String);

impl fmt::Display for NonFinite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NonFinite {}

impl ser::Error for NonFinite {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        NonFinite(msg.to_string())
    }
}

/// Fails if `value` contains NaN or an infinity anywhere.
pub fn check_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), NonFinite> {
    value.serialize(FloatCheck)
}

#[derive(Clone, Copy)]
struct FloatCheck;

fn finite(value: f64) -> Result<(), NonFinite> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(NonFinite(format!("{value} has no JSON representation")))
    }
}

impl Serializer for FloatCheck {
    type Ok = ();
    type Error = NonFinite;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Result<(), NonFinite> {
        finite(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<(), NonFinite> {
        finite(v)
    }

    fn serialize_bool(self, _: bool) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_char(self, _: char) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, NonFinite> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FloatCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeTuple for FloatCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FloatCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FloatCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeMap for FloatCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), NonFinite> {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeStruct for FloatCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FloatCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}
