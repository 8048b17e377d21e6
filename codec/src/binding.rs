//! Registry-driven conversion at the driver boundary.
//!
//! Toward the driver a typed value becomes a [`WireValue`] parameter; from
//! the driver a retrieved [`WireValue`] becomes a typed value again. Both
//! directions resolve the codec through the registry for the exact requested
//! type.

use std::any::type_name;

use crate::error::CodecError;
use crate::registry::CodecRegistry;
use crate::wire::{WireType, WireValue};

impl CodecRegistry {
    /// Encode `value` as a parameter for a column of type `wire`.
    pub fn bind<T: 'static>(&self, value: &T, wire: WireType) -> Result<WireValue, CodecError> {
        let text = self.encode(value, wire)?;
        Ok(WireValue::from_wire_text(text, wire))
    }

    /// Decode a retrieved value as `T`, read from a column of type `wire`.
    ///
    /// Only `Text` and `Json` values carry a payload; anything else (including
    /// null) is a shape mismatch.
    pub fn extract<T: 'static>(&self, raw: &WireValue, wire: WireType) -> Result<T, CodecError> {
        let codec = self.lookup::<T>(wire)?;
        match raw.as_text() {
            Some(text) => codec.decode(text),
            None => Err(CodecError::shape(
                type_name::<T>(),
                format!("expected JSON text, found a {} value", raw.type_name()),
            )),
        }
    }
}
