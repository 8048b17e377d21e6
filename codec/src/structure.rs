//! The abstract "any JSON structure" domain type.
//!
//! A `JsonStructure` is either an object or an array. Codecs are registered
//! for `JsonStructure` itself, never for the narrower `Map` or `Vec`; callers
//! that want the concrete shape narrow explicitly after decoding.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonStructure {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl JsonStructure {
    /// Narrow to an object, handing the structure back if it is an array.
    pub fn into_object(self) -> Result<Map<String, Value>, Self> {
        match self {
            JsonStructure::Object(map) => Ok(map),
            other => Err(other),
        }
    }

    /// Narrow to an array, handing the structure back if it is an object.
    pub fn into_array(self) -> Result<Vec<Value>, Self> {
        match self {
            JsonStructure::Array(items) => Ok(items),
            other => Err(other),
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            JsonStructure::Object(map) => Some(map),
            JsonStructure::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            JsonStructure::Array(items) => Some(items),
            JsonStructure::Object(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JsonStructure::Object(_) => "object",
            JsonStructure::Array(_) => "array",
        }
    }

    /// Accept a parsed value, handing scalars back.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(JsonStructure::Object(map)),
            Value::Array(items) => Ok(JsonStructure::Array(items)),
            other => Err(other),
        }
    }
}

impl From<Map<String, Value>> for JsonStructure {
    fn from(map: Map<String, Value>) -> Self {
        JsonStructure::Object(map)
    }
}

impl From<Vec<Value>> for JsonStructure {
    fn from(items: Vec<Value>) -> Self {
        JsonStructure::Array(items)
    }
}

impl From<JsonStructure> for Value {
    fn from(structure: JsonStructure) -> Self {
        match structure {
            JsonStructure::Object(map) => Value::Object(map),
            JsonStructure::Array(items) => Value::Array(items),
        }
    }
}
