//! Codec trait and the JSON codecs shipped with the crate.
//!
//! A codec maps exactly one domain type to and from [`WireText`]. Codecs are
//! pure: they hold no mutable state, so a single instance is shared by every
//! caller once it has been registered.
//!
//! # Unknown fields
//!
//! [`JsonCodec`] follows the serde attributes of its target type. Fields the
//! type does not declare are ignored, unless the type is marked
//! `#[serde(deny_unknown_fields)]`, in which case they are rejected as a
//! `MalformedPayload`.
//!
//! # Numbers
//!
//! Integer fields decode exactly. `35.0` or `3000000000` for an `i32` field is
//! a `MalformedPayload`, never a rounded or truncated value. NaN and the
//! infinities have no JSON form, so encoding a value holding one is
//! `Unencodable` rather than a `null` the codec could not decode again.

use std::any::type_name;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

use crate::error::CodecError;
use crate::float_check::check_finite;
use crate::structure::JsonStructure;
use crate::wire::WireText;

/// Bidirectional mapping between a domain type and its JSON text.
pub trait Codec: Send + Sync {
    /// The domain type produced by `decode`.
    type Value: 'static;

    /// Encode a value.
    ///
    /// Fails with `Unencodable` when the value has no JSON form: a
    /// non-finite float, or a hand-written `Serialize` impl that refuses it.
    fn encode(&self, value: &Self::Value) -> Result<WireText, CodecError>;

    /// Decode text, rejecting anything that is not JSON of the right shape.
    fn decode(&self, text: &str) -> Result<Self::Value, CodecError>;
}

/// Serde-backed codec for any serializable type.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<WireText, CodecError> {
        encode_json(type_name::<T>(), value)
    }

    fn decode(&self, text: &str) -> Result<T, CodecError> {
        serde_json::from_str(text).map_err(|e| CodecError::malformed(type_name::<T>(), &e))
    }
}

/// Codec for [`JsonStructure`]: objects and arrays only.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStructureCodec;

impl Codec for JsonStructureCodec {
    type Value = JsonStructure;

    fn encode(&self, value: &JsonStructure) -> Result<WireText, CodecError> {
        encode_json(type_name::<JsonStructure>(), value)
    }

    fn decode(&self, text: &str) -> Result<JsonStructure, CodecError> {
        let domain = type_name::<JsonStructure>();
        let value: Value =
            serde_json::from_str(text).map_err(|e| CodecError::malformed(domain, &e))?;
        JsonStructure::from_value(value).map_err(|scalar| {
            CodecError::shape(
                domain,
                format!("expected a JSON object or array, found {}", json_kind(&scalar)),
            )
        })
    }
}

/// Pass-through codec for callers that want the raw JSON text.
///
/// Both directions check the syntax: `WireText` can be built from any
/// string, and text that is not JSON never reaches the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawJsonCodec;

impl Codec for RawJsonCodec {
    type Value = WireText;

    fn encode(&self, value: &WireText) -> Result<WireText, CodecError> {
        serde_json::from_str::<IgnoredAny>(value.as_str()).map_err(|e| {
            CodecError::Unencodable {
                domain: type_name::<WireText>(),
                message: e.to_string(),
            }
        })?;
        Ok(value.clone())
    }

    fn decode(&self, text: &str) -> Result<WireText, CodecError> {
        serde_json::from_str::<IgnoredAny>(text)
            .map_err(|e| CodecError::malformed(type_name::<WireText>(), &e))?;
        Ok(WireText::from(text))
    }
}

fn encode_json<T: Serialize + ?Sized>(
    domain: &'static str,
    value: &T,
) -> Result<WireText, CodecError> {
    let unencodable = |message: String| CodecError::Unencodable { domain, message };
    check_finite(value).map_err(|e| unencodable(e.to_string()))?;
    serde_json::to_string(value)
        .map(WireText::from)
        .map_err(|e| unencodable(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
