//! Demo domain type and the registry the demo commands share.

use std::fmt;

use json_codec::{CodecError, CodecRegistry, JsonCodec, JsonStructure, WireType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user row. Unknown fields in a payload are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub age: i32,
}

impl User {
    pub fn new(id: i32, name: &str, age: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
        }
    }

    /// The user's profile as a free-form JSON object (name and age only).
    pub fn profile(&self) -> JsonStructure {
        let mut object = Map::new();
        object.insert("name".to_string(), Value::from(self.name.as_str()));
        object.insert("age".to_string(), Value::from(self.age));
        JsonStructure::from(object)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {}, age {})", self.name, self.id, self.age)
    }
}

/// alice and bob, in id order.
pub fn demo_users() -> Vec<User> {
    vec![User::new(1, "alice", 30), User::new(2, "bob", 35)]
}

/// Built-in codecs plus `User` on text columns.
pub fn demo_registry() -> Result<CodecRegistry, CodecError> {
    let mut builder = CodecRegistry::builder().with_builtin_codecs()?;
    builder.register(WireType::Text, JsonCodec::<User>::new())?;
    Ok(builder.build())
}
