//! Session abstraction toward the data store driver.
//!
//! This module defines the surface the codec layer needs from a driver:
//! schema statements, prepared statements with named `$parameters`, row
//! retrieval, and whole-row JSON insertion/selection. The CozoDB and
//! PostgreSQL drivers implement the same [`Session`] trait.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::error::DbError;
use crate::registry::CodecRegistry;
use crate::wire::{WireText, WireType, WireValue};

pub mod escape;
pub mod placeholder;

pub use placeholder::QuoteStyle;

#[cfg(feature = "backend-cozo")]
pub mod cozo;
#[cfg(feature = "backend-postgres")]
pub mod postgres;

/// Header of the single column returned by [`Session::select_json`].
pub const JSON_COLUMN: &str = "[json]";

/// Core trait for a store session.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait Session: Send + Sync {
    /// Backend name for logging and for picking backend-specific scripts.
    fn backend_name(&self) -> &'static str;

    /// Run a schema statement. A relation that already exists is not an error.
    fn execute_schema(&self, ddl: &str) -> Result<(), DbError>;

    /// Parse a statement and discover its `$name` parameters.
    fn prepare(&self, text: &str) -> Result<PreparedStatement, DbError> {
        Ok(PreparedStatement::new(text))
    }

    /// Execute a statement whose parameters have all been bound.
    fn execute(&self, statement: &BoundStatement<'_>) -> Result<ResultSet, DbError>;

    /// Execute a statement without parameters.
    ///
    /// This is a convenience method that prepares `text` and executes it
    /// with an empty binding.
    fn execute_unbound(&self, text: &str) -> Result<ResultSet, DbError> {
        let prepared = self.prepare(text)?;
        self.execute(&prepared.bind())
    }

    /// Render a value as an inline literal in this store's syntax.
    fn quote_literal(&self, value: &WireValue) -> String;

    /// Insert one row given as a JSON object keyed by column name.
    fn insert_json(&self, table: &str, payload: &WireText) -> Result<(), DbError>;

    /// Select the rows whose `key_column` is one of `keys`, each returned as a
    /// single [`JSON_COLUMN`] text value holding the row as a JSON object.
    fn select_json(
        &self,
        table: &str,
        key_column: &str,
        keys: &[WireValue],
    ) -> Result<ResultSet, DbError>;
}

/// A statement with its parameter names, ready to be bound.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    text: String,
    params: Vec<String>,
}

impl PreparedStatement {
    /// Discover parameters reading literals with backslash escapes.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_quote_style(text, QuoteStyle::Backslash)
    }

    pub fn with_quote_style(text: impl Into<String>, style: QuoteStyle) -> Self {
        let text = text.into();
        let params = placeholder::placeholder_names(&text, style);
        Self { text, params }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parameter names in order of first appearance.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn bind(&self) -> BoundStatement<'_> {
        BoundStatement {
            prepared: self,
            values: BTreeMap::new(),
        }
    }
}

/// A prepared statement plus its parameter values.
#[derive(Debug, Clone)]
pub struct BoundStatement<'a> {
    prepared: &'a PreparedStatement,
    values: BTreeMap<String, WireValue>,
}

impl<'a> BoundStatement<'a> {
    /// Bind a raw value to a named parameter.
    pub fn set(&mut self, name: &str, value: impl Into<WireValue>) -> Result<&mut Self, DbError> {
        if !self.prepared.params.iter().any(|p| p == name) {
            return Err(DbError::UnknownParameter {
                name: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), value.into());
        Ok(self)
    }

    pub fn set_null(&mut self, name: &str) -> Result<&mut Self, DbError> {
        self.set(name, WireValue::Null)
    }

    /// Bind a domain value, encoded by the codec registered for
    /// (`T`, `wire`).
    pub fn set_encoded<T: 'static>(
        &mut self,
        name: &str,
        value: &T,
        wire: WireType,
        registry: &CodecRegistry,
    ) -> Result<&mut Self, DbError> {
        let bound = registry.bind(value, wire)?;
        self.set(name, bound)
    }

    pub fn text(&self) -> &str {
        self.prepared.text()
    }

    pub fn prepared(&self) -> &PreparedStatement {
        self.prepared
    }

    /// All values by name.
    ///
    /// # Errors
    /// `UnboundParameter` for the first parameter without a value.
    pub fn values(&self) -> Result<&BTreeMap<String, WireValue>, DbError> {
        if let Some(missing) = self
            .prepared
            .params
            .iter()
            .find(|p| !self.values.contains_key(p.as_str()))
        {
            return Err(DbError::UnboundParameter {
                name: missing.clone(),
            });
        }
        Ok(&self.values)
    }
}

/// Column addressing by position or by name.
pub trait ColumnIndex: std::fmt::Debug {
    fn index_in(&self, headers: &[String], len: usize) -> Result<usize, DbError>;

    fn describe(&self, headers: &[String]) -> String;
}

impl ColumnIndex for usize {
    fn index_in(&self, _headers: &[String], len: usize) -> Result<usize, DbError> {
        if *self < len {
            Ok(*self)
        } else {
            Err(DbError::ColumnOutOfRange { index: *self, len })
        }
    }

    fn describe(&self, headers: &[String]) -> String {
        headers.get(*self).cloned().unwrap_or_else(|| self.to_string())
    }
}

impl ColumnIndex for &str {
    fn index_in(&self, headers: &[String], _len: usize) -> Result<usize, DbError> {
        headers
            .iter()
            .position(|h| h == self)
            .ok_or_else(|| DbError::MissingColumn {
                name: self.to_string(),
            })
    }

    fn describe(&self, _headers: &[String]) -> String {
        self.to_string()
    }
}

/// Rows returned by a statement, in store order.
#[derive(Debug, Clone)]
pub struct ResultSet {
    headers: Arc<[String]>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<WireValue>>) -> Self {
        let headers: Arc<[String]> = headers.into();
        let rows = rows
            .into_iter()
            .map(|values| Row {
                headers: Arc::clone(&headers),
                values,
            })
            .collect();
        Self { headers, rows }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'r> IntoIterator for &'r ResultSet {
    type Item = &'r Row;
    type IntoIter = std::slice::Iter<'r, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// One result row.
#[derive(Debug, Clone)]
pub struct Row {
    headers: Arc<[String]>,
    values: Vec<WireValue>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[WireValue] {
        &self.values
    }

    /// The retrieved value as-is.
    pub fn get_raw<I: ColumnIndex>(&self, column: I) -> Result<&WireValue, DbError> {
        self.cell(&column)
    }

    pub fn get_int<I: ColumnIndex>(&self, column: I) -> Result<i64, DbError> {
        match self.cell(&column)? {
            WireValue::Int(i) => Ok(*i),
            WireValue::Null => Err(DbError::NullValue {
                column: column.describe(&self.headers),
            }),
            other => Err(DbError::UnsupportedValue {
                column: column.describe(&self.headers),
                type_name: other.type_name().to_string(),
            }),
        }
    }

    /// The raw text of a text or JSON column, without any codec involved.
    pub fn get_string<I: ColumnIndex>(&self, column: I) -> Result<String, DbError> {
        let value = self.cell(&column)?;
        match value.as_text() {
            Some(text) => Ok(text.to_string()),
            None if value.is_null() => Err(DbError::NullValue {
                column: column.describe(&self.headers),
            }),
            None => Err(DbError::UnsupportedValue {
                column: column.describe(&self.headers),
                type_name: value.type_name().to_string(),
            }),
        }
    }

    /// Decode a column through the codec registered for (`T`, `wire`).
    pub fn get<T: 'static, I: ColumnIndex>(
        &self,
        column: I,
        wire: WireType,
        registry: &CodecRegistry,
    ) -> Result<T, DbError> {
        self.decode_cell(&column, wire, registry)?
            .ok_or_else(|| DbError::NullValue {
                column: column.describe(&self.headers),
            })
    }

    /// Like [`Row::get`], mapping a null column to `None`.
    pub fn get_opt<T: 'static, I: ColumnIndex>(
        &self,
        column: I,
        wire: WireType,
        registry: &CodecRegistry,
    ) -> Result<Option<T>, DbError> {
        self.decode_cell(&column, wire, registry)
    }

    fn cell<I: ColumnIndex>(&self, column: &I) -> Result<&WireValue, DbError> {
        let index = column.index_in(&self.headers, self.values.len())?;
        self.values.get(index).ok_or(DbError::ColumnOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    fn decode_cell<T: 'static, I: ColumnIndex>(
        &self,
        column: &I,
        wire: WireType,
        registry: &CodecRegistry,
    ) -> Result<Option<T>, DbError> {
        let value = self.cell(column)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(registry.extract(value, wire)?))
    }
}

/// Convert a retrieved value into a JSON value for whole-row JSON output.
///
/// `Json` cells are embedded as structured JSON; `Text` cells stay strings.
pub(crate) fn wire_to_json(column: &str, value: &WireValue) -> Result<Value, DbError> {
    Ok(match value {
        WireValue::Null => Value::Null,
        WireValue::Int(i) => Value::from(*i),
        WireValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        WireValue::Bool(b) => Value::Bool(*b),
        WireValue::Text(s) => Value::String(s.clone()),
        WireValue::Json(text) => serde_json::from_str(text.as_str()).map_err(|e| {
            DbError::UnsupportedValue {
                column: column.to_string(),
                type_name: format!("json ({e})"),
            }
        })?,
    })
}

/// Serialize one row as a JSON object keyed by column name.
pub(crate) fn row_to_json_text(headers: &[String], values: &[WireValue]) -> Result<String, DbError> {
    let mut object = serde_json::Map::new();
    for (header, value) in headers.iter().zip(values) {
        object.insert(header.clone(), wire_to_json(header, value)?);
    }
    Ok(Value::Object(object).to_string())
}

/// Open an in-memory session for tests, using the default backend.
#[cfg(all(any(test, feature = "test-utils"), feature = "backend-cozo"))]
pub fn open_mem_session() -> Result<Box<dyn Session>, DbError> {
    Ok(Box::new(cozo::CozoSession::open_mem()?))
}
