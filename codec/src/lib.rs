//! Typed JSON codecs for a row-store driver.
//!
//! A [`CodecRegistry`] maps `(domain type, wire type)` pairs to codecs that
//! turn typed values into JSON wire text and back. Statement binding and row
//! extraction go through the registry, so a prepared statement parameter or
//! a retrieved column can be a domain value rather than a raw string.

pub mod backend;
mod binding;
pub mod codecs;
pub mod config;
pub mod error;
mod float_check;
pub mod registry;
pub mod structure;
pub mod wire;

#[cfg(all(any(test, feature = "test-utils"), feature = "backend-cozo"))]
pub mod test_utils;

pub use backend::{
    BoundStatement, ColumnIndex, JSON_COLUMN, PreparedStatement, ResultSet, Row, Session,
};
pub use codecs::{Codec, JsonCodec, JsonStructureCodec, RawJsonCodec};
pub use config::{ConfigFile, PostgresConfig, SessionConfig};
pub use error::{CodecError, DbError, PayloadFault};
pub use registry::{CodecRegistry, CodecRegistryBuilder};
pub use structure::JsonStructure;
pub use wire::{WireText, WireType, WireValue};
