//! Error types for codecs, the registry and the session layer.

use std::fmt;

use thiserror::Error;

use crate::wire::WireType;

/// Which part of a payload made it unacceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFault {
    /// The text is not JSON at all, or has trailing data after the value.
    Syntax,
    /// The text ends in the middle of a value.
    Truncated,
    /// Valid JSON that does not fit the target type.
    Shape,
}

impl fmt::Display for PayloadFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadFault::Syntax => "syntax",
            PayloadFault::Truncated => "truncated",
            PayloadFault::Shape => "shape",
        };
        f.write_str(name)
    }
}

impl From<&serde_json::Error> for PayloadFault {
    fn from(err: &serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => PayloadFault::Shape,
            Category::Eof => PayloadFault::Truncated,
            Category::Syntax | Category::Io => PayloadFault::Syntax,
        }
    }
}

/// Errors raised by codecs and the codec registry.
///
/// None of these are retried: a malformed payload stays malformed and a
/// missing or duplicate registration is a configuration defect.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed {domain} payload ({fault}): {message}")]
    MalformedPayload {
        domain: &'static str,
        fault: PayloadFault,
        message: String,
    },

    #[error("No codec registered for {domain} <-> {wire}")]
    CodecNotFound {
        domain: &'static str,
        wire: WireType,
    },

    #[error("A codec for {domain} <-> {wire} is already registered")]
    DuplicateRegistration {
        domain: &'static str,
        wire: WireType,
    },

    #[error("Failed to encode {domain}: {message}")]
    Unencodable { domain: &'static str, message: String },
}

impl CodecError {
    /// Build a `MalformedPayload` from a JSON parser error.
    pub fn malformed(domain: &'static str, err: &serde_json::Error) -> Self {
        CodecError::MalformedPayload {
            domain,
            fault: PayloadFault::from(err),
            message: err.to_string(),
        }
    }

    /// Build a `MalformedPayload` for JSON that parsed but has the wrong shape.
    pub fn shape(domain: &'static str, message: impl Into<String>) -> Self {
        CodecError::MalformedPayload {
            domain,
            fault: PayloadFault::Shape,
            message: message.into(),
        }
    }

    /// The fault of a `MalformedPayload`, `None` for every other variant.
    pub fn fault(&self) -> Option<PayloadFault> {
        match self {
            CodecError::MalformedPayload { fault, .. } => Some(*fault),
            _ => None,
        }
    }
}

/// Session layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to open database '{path}': {message}")]
    OpenFailed { path: String, message: String },

    #[error("Failed to connect to {backend}: {message}")]
    ConnectFailed { backend: &'static str, message: String },

    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    #[error("Missing column '{name}' in query result")]
    MissingColumn { name: String },

    #[error("Column index {index} out of range for a row of {len} column(s)")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("Table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("Statement has no parameter named '{name}'")]
    UnknownParameter { name: String },

    #[error("Parameter '{name}' was never bound")]
    UnboundParameter { name: String },

    #[error("Column '{column}' is null")]
    NullValue { column: String },

    #[error("Unsupported {type_name} value in column '{column}'")]
    UnsupportedValue { column: String, type_name: String },

    #[error("Value for parameter '{name}' does not fit {target}")]
    ParameterOutOfRange { name: String, target: &'static str },

    #[error("Invalid identifier '{name}'")]
    InvalidIdentifier { name: String },

    #[error("The {backend} backend is not available in this build")]
    BackendUnavailable { backend: &'static str },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
