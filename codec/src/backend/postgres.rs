//! PostgreSQL session.
//!
//! Statements keep their `$name` placeholders until execution, where they
//! are rewritten to positional `$1..$n`. The statement is prepared first so
//! each value can be converted to the type the server inferred for its
//! placeholder.

use std::sync::{Mutex, MutexGuard};

use postgres::error::SqlState;
use postgres::types::{FromSql, ToSql, Type};
use postgres::{Client, NoTls};
use serde_json::Value;
use tracing::debug;

use super::escape::escape_sql_string;
use super::placeholder::{to_positional, validate_identifier};
use super::{BoundStatement, JSON_COLUMN, PreparedStatement, QuoteStyle, ResultSet, Session};
use crate::error::{CodecError, DbError};
use crate::wire::{WireText, WireValue};

const BACKEND: &str = "postgres";

const ROW_PAYLOAD: &str = "JSON row";
const JSON_PARAMETER: &str = "JSON parameter";

type SqlParam = Box<dyn ToSql + Sync>;

/// PostgreSQL session implementing the [`Session`] trait.
///
/// The client is not `Sync`, so access is serialised through a mutex.
pub struct PostgresSession {
    client: Mutex<Client>,
}

impl PostgresSession {
    /// Connect with a libpq-style connection string or `postgres://` URL.
    pub fn connect(connection_string: &str) -> Result<Self, DbError> {
        let client = Client::connect(connection_string, NoTls).map_err(|e| {
            DbError::ConnectFailed {
                backend: BACKEND,
                message: e.to_string(),
            }
        })?;
        debug!(backend = BACKEND, "connected");
        Ok(Self {
            client: Mutex::new(client),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Client>, DbError> {
        self.client.lock().map_err(|e| DbError::QueryFailed {
            message: format!("connection lock poisoned: {}", e),
        })
    }
}

impl Session for PostgresSession {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn execute_schema(&self, ddl: &str) -> Result<(), DbError> {
        let mut client = self.lock()?;
        match client.batch_execute(ddl) {
            Ok(()) => Ok(()),
            Err(e) if e.code() == Some(&SqlState::DUPLICATE_TABLE) => {
                debug!(backend = BACKEND, "table already exists, keeping it");
                Ok(())
            }
            Err(e) => Err(query_failed(e)),
        }
    }

    fn prepare(&self, text: &str) -> Result<PreparedStatement, DbError> {
        Ok(PreparedStatement::with_quote_style(text, QuoteStyle::Standard))
    }

    fn execute(&self, statement: &BoundStatement<'_>) -> Result<ResultSet, DbError> {
        let (sql, names) = to_positional(statement.text());
        let values = statement.values()?;
        debug!(backend = BACKEND, sql = %sql, "executing statement");

        let mut client = self.lock()?;
        let prepared = client.prepare(&sql).map_err(query_failed)?;

        let params = names
            .iter()
            .zip(prepared.params())
            .map(|(name, ty)| {
                let value = values.get(name).ok_or_else(|| DbError::UnboundParameter {
                    name: name.clone(),
                })?;
                to_sql_param(name, ty, value)
            })
            .collect::<Result<Vec<SqlParam>, DbError>>()?;
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p.as_ref()).collect();

        let headers: Vec<String> = prepared
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let rows = client.query(&prepared, &refs).map_err(query_failed)?;
        let converted = rows
            .iter()
            .map(|row| (0..row.len()).map(|idx| from_sql_cell(row, idx)).collect())
            .collect::<Result<Vec<Vec<WireValue>>, DbError>>()?;
        Ok(ResultSet::new(headers, converted))
    }

    fn quote_literal(&self, value: &WireValue) -> String {
        quote_sql_literal(value)
    }

    fn insert_json(&self, table: &str, payload: &WireText) -> Result<(), DbError> {
        validate_identifier(table)?;
        let row = match serde_json::from_str::<Value>(payload.as_str()) {
            Ok(row @ Value::Object(_)) => row,
            Ok(_) => {
                return Err(CodecError::shape(ROW_PAYLOAD, "expected a JSON object").into());
            }
            Err(e) => return Err(CodecError::malformed(ROW_PAYLOAD, &e).into()),
        };

        let sql = format!("INSERT INTO {table} SELECT * FROM json_populate_record(NULL::{table}, $1)");
        debug!(backend = BACKEND, sql = %sql, "inserting JSON row");
        let mut client = self.lock()?;
        client.execute(sql.as_str(), &[&row]).map_err(query_failed)?;
        Ok(())
    }

    fn select_json(
        &self,
        table: &str,
        key_column: &str,
        keys: &[WireValue],
    ) -> Result<ResultSet, DbError> {
        validate_identifier(table)?;
        validate_identifier(key_column)?;
        if keys.is_empty() {
            return Ok(ResultSet::new(vec![JSON_COLUMN.to_string()], Vec::new()));
        }

        let literals: Vec<String> = keys.iter().map(quote_sql_literal).collect();
        let sql = select_json_sql(table, key_column, &literals);
        debug!(backend = BACKEND, sql = %sql, "selecting JSON rows");

        let mut client = self.lock()?;
        let rows = client.query(sql.as_str(), &[]).map_err(query_failed)?;
        let converted = rows
            .iter()
            .map(|row| from_sql_cell(row, 0).map(|cell| vec![cell]))
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(ResultSet::new(vec![JSON_COLUMN.to_string()], converted))
    }
}

fn query_failed(e: postgres::Error) -> DbError {
    DbError::QueryFailed {
        message: e.to_string(),
    }
}

fn select_json_sql(table: &str, key_column: &str, literals: &[String]) -> String {
    format!(
        "SELECT row_to_json(t)::text AS \"{JSON_COLUMN}\" FROM {table} t \
         WHERE t.{key_column} IN ({}) ORDER BY t.{key_column}",
        literals.join(", ")
    )
}

fn quote_sql_literal(value: &WireValue) -> String {
    match value {
        WireValue::Null => "NULL".to_string(),
        WireValue::Int(i) => i.to_string(),
        WireValue::Float(f) if f.is_finite() => format!("{:?}", f),
        WireValue::Float(f) => format!("'{}'::float8", f),
        WireValue::Bool(true) => "TRUE".to_string(),
        WireValue::Bool(false) => "FALSE".to_string(),
        WireValue::Text(s) => format!("'{}'", escape_sql_string(s)),
        WireValue::Json(json) => format!("'{}'", escape_sql_string(json.as_str())),
    }
}

/// Convert a bound value to the type the server inferred for its placeholder.
fn to_sql_param(name: &str, ty: &Type, value: &WireValue) -> Result<SqlParam, DbError> {
    let mismatch = || DbError::UnsupportedValue {
        column: name.to_string(),
        type_name: format!("{} as {}", value.type_name(), ty.name()),
    };

    if *ty == Type::INT2 {
        return int_param::<i16>(name, value, "int2", mismatch);
    }
    if *ty == Type::INT4 {
        return int_param::<i32>(name, value, "int4", mismatch);
    }
    if *ty == Type::INT8 {
        return int_param::<i64>(name, value, "int8", mismatch);
    }
    if *ty == Type::FLOAT4 {
        return match value {
            WireValue::Null => Ok(Box::new(None::<f32>)),
            other => other
                .as_f64()
                .map(|f| Box::new(f as f32) as SqlParam)
                .ok_or_else(mismatch),
        };
    }
    if *ty == Type::FLOAT8 {
        return match value {
            WireValue::Null => Ok(Box::new(None::<f64>)),
            other => other.as_f64().map(|f| Box::new(f) as SqlParam).ok_or_else(mismatch),
        };
    }
    if *ty == Type::BOOL {
        return match value {
            WireValue::Null => Ok(Box::new(None::<bool>)),
            other => other.as_bool().map(|b| Box::new(b) as SqlParam).ok_or_else(mismatch),
        };
    }
    if *ty == Type::JSON || *ty == Type::JSONB {
        return match value {
            WireValue::Null => Ok(Box::new(None::<Value>)),
            WireValue::Text(text) => parse_json_param(text),
            WireValue::Json(json) => parse_json_param(json.as_str()),
            WireValue::Int(i) => Ok(Box::new(Value::from(*i))),
            WireValue::Bool(b) => Ok(Box::new(Value::Bool(*b))),
            WireValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(|n| Box::new(Value::Number(n)) as SqlParam)
                .ok_or_else(mismatch),
        };
    }
    if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME {
        return match value {
            WireValue::Null => Ok(Box::new(None::<String>)),
            WireValue::Text(s) => Ok(Box::new(s.clone())),
            WireValue::Json(json) => Ok(Box::new(json.as_str().to_string())),
            _ => Err(mismatch()),
        };
    }
    Err(mismatch())
}

fn int_param<T>(
    name: &str,
    value: &WireValue,
    target: &'static str,
    mismatch: impl FnOnce() -> DbError,
) -> Result<SqlParam, DbError>
where
    T: TryFrom<i64> + ToSql + Sync + 'static,
{
    match value {
        WireValue::Null => Ok(Box::new(None::<T>)),
        WireValue::Int(i) => T::try_from(*i)
            .map(|v| Box::new(v) as SqlParam)
            .map_err(|_| DbError::ParameterOutOfRange {
                name: name.to_string(),
                target,
            }),
        _ => Err(mismatch()),
    }
}

fn parse_json_param(text: &str) -> Result<SqlParam, DbError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CodecError::malformed(JSON_PARAMETER, &e))?;
    Ok(Box::new(value))
}

fn from_sql_cell(row: &postgres::Row, idx: usize) -> Result<WireValue, DbError> {
    let column = &row.columns()[idx];
    let ty = column.type_();

    if *ty == Type::BOOL {
        return cell::<bool>(row, idx).map(|v| v.map_or(WireValue::Null, WireValue::Bool));
    }
    if *ty == Type::INT2 {
        return cell::<i16>(row, idx).map(|v| v.map_or(WireValue::Null, |i| WireValue::Int(i.into())));
    }
    if *ty == Type::INT4 {
        return cell::<i32>(row, idx).map(|v| v.map_or(WireValue::Null, |i| WireValue::Int(i.into())));
    }
    if *ty == Type::INT8 {
        return cell::<i64>(row, idx).map(|v| v.map_or(WireValue::Null, WireValue::Int));
    }
    if *ty == Type::FLOAT4 {
        return cell::<f32>(row, idx)
            .map(|v| v.map_or(WireValue::Null, |f| WireValue::Float(f.into())));
    }
    if *ty == Type::FLOAT8 {
        return cell::<f64>(row, idx).map(|v| v.map_or(WireValue::Null, WireValue::Float));
    }
    if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME {
        return cell::<String>(row, idx).map(|v| v.map_or(WireValue::Null, WireValue::Text));
    }
    if *ty == Type::JSON || *ty == Type::JSONB {
        return cell::<JsonText>(row, idx)
            .map(|v| v.map_or(WireValue::Null, |json| WireValue::Json(WireText::from(json.0))));
    }

    Err(DbError::UnsupportedValue {
        column: column.name().to_string(),
        type_name: ty.name().to_string(),
    })
}

/// A `json` or `jsonb` cell as the text the server sent, without reparsing.
///
/// `json` keeps the stored text verbatim; `jsonb` arrives already
/// normalised by the server.
#[derive(Debug)]
struct JsonText(String);

impl<'a> FromSql<'a> for JsonText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        let text = if *ty == Type::JSONB {
            match raw.split_first() {
                Some((1, rest)) => rest,
                _ => return Err("unsupported jsonb encoding version".into()),
            }
        } else {
            raw
        };
        Ok(JsonText(std::str::from_utf8(text)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::JSON || *ty == Type::JSONB
    }
}

fn cell<'a, T: FromSql<'a>>(row: &'a postgres::Row, idx: usize) -> Result<Option<T>, DbError> {
    row.try_get::<_, Option<T>>(idx).map_err(query_failed)
}
