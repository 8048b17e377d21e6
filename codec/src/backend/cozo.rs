//! CozoDB session.
//!
//! Wraps a `DbInstance` (in-memory or SQLite storage). Named `$parameters`
//! are handed to Cozo as-is; whole-row JSON is implemented on top of the
//! `::columns` system op and `:put`.

use std::collections::BTreeMap;
use std::path::Path;

use cozo::{DataValue, DbInstance, NamedRows, Num, ScriptMutability};
use serde_json::Value;
use tracing::debug;

use super::escape::escape_cozo_string;
use super::placeholder::validate_identifier;
use super::{BoundStatement, JSON_COLUMN, ResultSet, Session, row_to_json_text};
use crate::error::{CodecError, DbError};
use crate::wire::{WireText, WireValue};

const BACKEND: &str = "cozo";

/// Domain name reported when a row payload is rejected.
const ROW_PAYLOAD: &str = "JSON row";

/// CozoDB session implementing the [`Session`] trait.
pub struct CozoSession {
    inner: DbInstance,
}

/// One column of a stored relation, as reported by `::columns`.
#[derive(Debug, Clone, PartialEq)]
struct RelationColumn {
    name: String,
    is_key: bool,
}

impl CozoSession {
    /// Open a CozoDB database backed by SQLite storage at `path`.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let inner = DbInstance::new("sqlite", path, "").map_err(|e| DbError::OpenFailed {
            path: path.display().to_string(),
            message: format!("{:?}", e),
        })?;
        debug!(path = %path.display(), "opened cozo sqlite storage");
        Ok(Self { inner })
    }

    /// Open an in-memory CozoDB database.
    pub fn open_mem() -> Result<Self, DbError> {
        let inner = DbInstance::new("mem", "", "").map_err(|e| DbError::OpenFailed {
            path: ":memory:".to_string(),
            message: format!("{:?}", e),
        })?;
        Ok(Self { inner })
    }

    fn run(&self, script: &str, params: BTreeMap<String, DataValue>) -> Result<NamedRows, DbError> {
        debug!(backend = BACKEND, script, "running script");
        self.inner
            .run_script(script, params, ScriptMutability::Mutable)
            .map_err(|e| DbError::QueryFailed {
                message: format!("{:?}", e),
            })
    }

    /// Columns of a stored relation in declaration order.
    fn columns(&self, table: &str) -> Result<Vec<RelationColumn>, DbError> {
        let rows = self.run(&format!("::columns {table}"), BTreeMap::new())?;
        let name_idx = header_position(&rows.headers, "column").unwrap_or(0);
        let key_idx = header_position(&rows.headers, "is_key").unwrap_or(1);
        let order_idx = header_position(&rows.headers, "index");

        let mut columns: Vec<(i64, RelationColumn)> = rows
            .rows
            .iter()
            .enumerate()
            .filter_map(|(position, row)| {
                let name = match row.get(name_idx) {
                    Some(DataValue::Str(s)) => s.to_string(),
                    _ => return None,
                };
                let is_key = matches!(row.get(key_idx), Some(DataValue::Bool(true)));
                let order = order_idx
                    .and_then(|idx| match row.get(idx) {
                        Some(DataValue::Num(Num::Int(i))) => Some(*i),
                        _ => None,
                    })
                    .unwrap_or(position as i64);
                Some((order, RelationColumn { name, is_key }))
            })
            .collect();
        columns.sort_by_key(|(order, _)| *order);
        Ok(columns.into_iter().map(|(_, column)| column).collect())
    }
}

impl Session for CozoSession {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn execute_schema(&self, ddl: &str) -> Result<(), DbError> {
        match self.run(ddl, BTreeMap::new()) {
            Ok(_) => Ok(()),
            Err(DbError::QueryFailed { message })
                if message.contains("AlreadyExists")
                    || message.contains("stored_relation_conflict") =>
            {
                debug!(backend = BACKEND, "relation already exists, keeping it");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn execute(&self, statement: &BoundStatement<'_>) -> Result<ResultSet, DbError> {
        let params = statement
            .values()?
            .iter()
            .map(|(name, value)| (name.clone(), to_data_value(value)))
            .collect();
        let rows = self.run(statement.text(), params)?;
        to_result_set(rows)
    }

    fn quote_literal(&self, value: &WireValue) -> String {
        match value {
            WireValue::Null => "null".to_string(),
            WireValue::Int(i) => i.to_string(),
            WireValue::Float(f) => format!("{:?}", f),
            WireValue::Bool(b) => b.to_string(),
            WireValue::Text(s) => format!("\"{}\"", escape_cozo_string(s)),
            WireValue::Json(json) => format!("\"{}\"", escape_cozo_string(json.as_str())),
        }
    }

    fn insert_json(&self, table: &str, payload: &WireText) -> Result<(), DbError> {
        validate_identifier(table)?;
        let object = match serde_json::from_str::<Value>(payload.as_str()) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                return Err(CodecError::shape(ROW_PAYLOAD, "expected a JSON object").into());
            }
            Err(e) => return Err(CodecError::malformed(ROW_PAYLOAD, &e).into()),
        };

        let columns = self.columns(table)?;
        if let Some(unknown) = object
            .keys()
            .find(|key| !columns.iter().any(|c| &c.name == *key))
        {
            return Err(DbError::UnknownColumn {
                table: table.to_string(),
                column: unknown.clone(),
            });
        }

        let params: BTreeMap<String, DataValue> = columns
            .iter()
            .map(|c| {
                let value = object.get(&c.name).map(json_to_data_value).unwrap_or(DataValue::Null);
                (c.name.clone(), value)
            })
            .collect();

        let script = put_script(table, &columns);
        self.run(&script, params)?;
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

        let columns = self.columns(table)?;
        if !columns.iter().any(|c| c.name == key_column) {
            return Err(DbError::UnknownColumn {
                table: table.to_string(),
                column: key_column.to_string(),
            });
        }

        let names = columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let script = format!("?[{names}] := *{table}{{{names}}}, is_in({key_column}, $keys)");

        let mut params = BTreeMap::new();
        params.insert(
            "keys".to_string(),
            DataValue::List(keys.iter().map(to_data_value).collect()),
        );

        let rows = to_result_set(self.run(&script, params)?)?;
        let json_rows = rows
            .iter()
            .map(|row| {
                row_to_json_text(rows.headers(), row.values()).map(|text| vec![WireValue::Text(text)])
            })
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(ResultSet::new(vec![JSON_COLUMN.to_string()], json_rows))
    }
}

/// `?[a, b, c] <- [[$a, $b, $c]] :put table {a => b, c}`
fn put_script(table: &str, columns: &[RelationColumn]) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let placeholders: Vec<String> = names.iter().map(|n| format!("${n}")).collect();
    let keys: Vec<&str> = columns.iter().filter(|c| c.is_key).map(|c| c.name.as_str()).collect();
    let values: Vec<&str> = columns.iter().filter(|c| !c.is_key).map(|c| c.name.as_str()).collect();

    let spec = if values.is_empty() {
        keys.join(", ")
    } else {
        format!("{} => {}", keys.join(", "), values.join(", "))
    };

    format!(
        "?[{}] <- [[{}]] :put {table} {{{spec}}}",
        names.join(", "),
        placeholders.join(", ")
    )
}

fn header_position(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn to_data_value(value: &WireValue) -> DataValue {
    match value {
        WireValue::Null => DataValue::Null,
        WireValue::Int(i) => DataValue::Num(Num::Int(*i)),
        WireValue::Float(f) => DataValue::Num(Num::Float(*f)),
        WireValue::Bool(b) => DataValue::Bool(*b),
        WireValue::Text(s) => DataValue::Str(s.as_str().into()),
        WireValue::Json(json) => DataValue::Str(json.as_str().into()),
    }
}

/// Nested arrays and objects are stored as their JSON text.
fn json_to_data_value(value: &Value) -> DataValue {
    match value {
        Value::Null => DataValue::Null,
        Value::Bool(b) => DataValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DataValue::Num(Num::Int(i)),
            None => DataValue::Num(Num::Float(n.as_f64().unwrap_or(f64::NAN))),
        },
        Value::String(s) => DataValue::Str(s.as_str().into()),
        nested => DataValue::Str(nested.to_string().into()),
    }
}

fn to_result_set(rows: NamedRows) -> Result<ResultSet, DbError> {
    let converted = rows
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&rows.headers)
                .map(|(value, column)| from_data_value(column, value))
                .collect::<Result<Vec<_>, DbError>>()
        })
        .collect::<Result<Vec<_>, DbError>>()?;
    Ok(ResultSet::new(rows.headers, converted))
}

fn from_data_value(column: &str, value: &DataValue) -> Result<WireValue, DbError> {
    match value {
        DataValue::Null => Ok(WireValue::Null),
        DataValue::Bool(b) => Ok(WireValue::Bool(*b)),
        DataValue::Num(Num::Int(i)) => Ok(WireValue::Int(*i)),
        DataValue::Num(Num::Float(f)) => Ok(WireValue::Float(*f)),
        DataValue::Str(s) => Ok(WireValue::Text(s.to_string())),
        DataValue::Json(json) => Ok(WireValue::Json(WireText::from(json.0.to_string()))),
        DataValue::List(_) => data_value_to_json(value)
            .map(|json| WireValue::Json(WireText::from(json.to_string())))
            .ok_or_else(|| unsupported(column, value)),
        other => Err(unsupported(column, other)),
    }
}

fn data_value_to_json(value: &DataValue) -> Option<Value> {
    match value {
        DataValue::Null => Some(Value::Null),
        DataValue::Bool(b) => Some(Value::Bool(*b)),
        DataValue::Num(Num::Int(i)) => Some(Value::from(*i)),
        DataValue::Num(Num::Float(f)) => serde_json::Number::from_f64(*f).map(Value::Number),
        DataValue::Str(s) => Some(Value::String(s.to_string())),
        DataValue::Json(json) => Some(json.0.clone()),
        DataValue::List(items) => items
            .iter()
            .map(data_value_to_json)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}

fn unsupported(column: &str, value: &DataValue) -> DbError {
    DbError::UnsupportedValue {
        column: column.to_string(),
        type_name: cozo_type_name(value).to_string(),
    }
}

fn cozo_type_name(value: &DataValue) -> &'static str {
    match value {
        DataValue::Null => "null",
        DataValue::Bool(_) => "bool",
        DataValue::Num(_) => "number",
        DataValue::Str(_) => "string",
        DataValue::Bytes(_) => "bytes",
        DataValue::List(_) => "list",
        DataValue::Set(_) => "set",
        DataValue::Vec(_) => "vec",
        DataValue::Json(_) => "json",
        DataValue::Uuid(_) => "uuid",
        DataValue::Regex(_) => "regex",
        DataValue::Bot => "bot",
        DataValue::Validity(_) => "validity",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PreparedStatement;
    use crate::error::PayloadFault;
    use rstest::{fixture, rstest};
    use serde_json::json;

    const USERS_SCHEMA: &str = ":create users {id: Int => name: String?, age: Int?}";

    #[fixture]
    fn session() -> CozoSession {
        let session = CozoSession::open_mem().unwrap();
        session.execute_schema(USERS_SCHEMA).unwrap();
        session
    }

    #[rstest]
    fn test_execute_schema_twice_is_not_an_error(session: CozoSession) {
        session.execute_schema(USERS_SCHEMA).unwrap();
    }

    #[rstest]
    fn test_execute_schema_reports_syntax_errors(session: CozoSession) {
        let err = session.execute_schema(":create broken {").unwrap_err();
        assert!(matches!(err, DbError::QueryFailed { .. }));
    }

    #[rstest]
    fn test_execute_query_no_params(session: CozoSession) {
        let result = session.execute_unbound("?[x, y] := x = 1, y = 'two'").unwrap();
        assert_eq!(result.headers(), &["x".to_string(), "y".to_string()]);
        assert_eq!(result.rows()[0].values(), &[WireValue::Int(1), WireValue::Text("two".into())]);
    }

    #[rstest]
    fn test_execute_with_bound_parameters(session: CozoSession) {
        let prepared = PreparedStatement::new("?[x, s] := x = $val, s = $label");
        let mut bound = prepared.bind();
        bound.set("val", 99).unwrap().set("label", "hi").unwrap();
        let result = session.execute(&bound).unwrap();
        assert_eq!(result.rows()[0].get_int("x").unwrap(), 99);
        assert_eq!(result.rows()[0].get_string("s").unwrap(), "hi");
    }

    #[rstest]
    fn test_execute_rejects_unbound_parameter(session: CozoSession) {
        let prepared = session.prepare("?[x] := x = $val").unwrap();
        let err = session.execute(&prepared.bind()).unwrap_err();
        assert!(matches!(err, DbError::UnboundParameter { .. }));
    }

    #[rstest]
    fn test_columns_in_declaration_order(session: CozoSession) {
        let columns = session.columns("users").unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "age"]);
        assert!(columns[0].is_key);
        assert!(!columns[1].is_key);
    }

    #[rstest]
    fn test_put_script() {
        let columns = vec![
            RelationColumn { name: "id".into(), is_key: true },
            RelationColumn { name: "json".into(), is_key: false },
        ];
        assert_eq!(
            put_script("t", &columns),
            "?[id, json] <- [[$id, $json]] :put t {id => json}"
        );
    }

    #[rstest]
    fn test_insert_and_select_json(session: CozoSession) {
        session
            .insert_json("users", &WireText::new(r#"{"id":2,"name":"bob","age":35}"#))
            .unwrap();
        session
            .insert_json("users", &WireText::new(r#"{"id":1,"name":"alice","age":30}"#))
            .unwrap();

        let rows = session
            .select_json("users", "id", &[WireValue::Int(1), WireValue::Int(2)])
            .unwrap();
        assert_eq!(rows.headers(), &[JSON_COLUMN.to_string()]);
        assert_eq!(rows.len(), 2);

        let first: Value = serde_json::from_str(&rows.rows()[0].get_string(0usize).unwrap()).unwrap();
        assert_eq!(first, json!({"id": 1, "name": "alice", "age": 30}));
    }

    #[rstest]
    fn test_insert_json_missing_columns_stored_as_null(session: CozoSession) {
        session
            .insert_json("users", &WireText::new(r#"{"id":3,"name":"carol"}"#))
            .unwrap();
        let rows = session.select_json("users", "id", &[WireValue::Int(3)]).unwrap();
        let row: Value = serde_json::from_str(&rows.rows()[0].get_string(JSON_COLUMN).unwrap()).unwrap();
        assert_eq!(row, json!({"id": 3, "name": "carol", "age": null}));
    }

    #[rstest]
    fn test_insert_json_unknown_column(session: CozoSession) {
        let err = session
            .insert_json("users", &WireText::new(r#"{"id":4,"email":"x@example.com"}"#))
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownColumn { column, .. } if column == "email"));
    }

    #[rstest]
    #[case("[1, 2]", PayloadFault::Shape)]
    #[case("not json", PayloadFault::Syntax)]
    fn test_insert_json_rejects_non_objects(
        session: CozoSession,
        #[case] payload: &str,
        #[case] fault: PayloadFault,
    ) {
        let err = session.insert_json("users", &WireText::new(payload)).unwrap_err();
        match err {
            DbError::Codec(codec) => assert_eq!(codec.fault(), Some(fault)),
            other => panic!("expected codec error, got {other:?}"),
        }
    }

    #[rstest]
    fn test_insert_json_rejects_bad_identifier(session: CozoSession) {
        let err = session
            .insert_json("users; ::remove users", &WireText::new("{}"))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidIdentifier { .. }));
    }

    #[rstest]
    fn test_select_json_unknown_key_column(session: CozoSession) {
        let err = session.select_json("users", "email", &[]).unwrap_err();
        assert!(matches!(err, DbError::UnknownColumn { .. }));
    }

    #[rstest]
    fn test_select_json_no_matches(session: CozoSession) {
        let rows = session.select_json("users", "id", &[WireValue::Int(42)]).unwrap();
        assert!(rows.is_empty());
    }

    #[rstest]
    fn test_quote_literal_round_trips_through_cozo(session: CozoSession) {
        let json = WireValue::Text(r#"{"name":"alice","quote":"say \"hi\""}"#.to_string());
        let script = format!("?[s] := s = {}", session.quote_literal(&json));
        let result = session.execute_unbound(&script).unwrap();
        assert_eq!(result.rows()[0].values()[0], json);
    }

    #[rstest]
    #[case(WireValue::Null, "null")]
    #[case(WireValue::Int(-3), "-3")]
    #[case(WireValue::Float(35.0), "35.0")]
    #[case(WireValue::Bool(false), "false")]
    #[case(WireValue::Text("a\"b".into()), r#""a\"b""#)]
    fn test_quote_literal(session: CozoSession, #[case] value: WireValue, #[case] expected: &str) {
        assert_eq!(session.quote_literal(&value), expected);
    }

    #[rstest]
    fn test_list_values_come_back_as_json() {
        let value = DataValue::List(vec![DataValue::Num(Num::Int(1)), DataValue::Str("a".into())]);
        let wire = from_data_value("c", &value).unwrap();
        assert_eq!(wire, WireValue::Json(WireText::new(r#"[1,"a"]"#)));
    }

    #[rstest]
    fn test_unsupported_value_reports_type() {
        let err = from_data_value("c", &DataValue::Bot).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedValue { type_name, .. } if type_name == "bot"));
    }

    #[rstest]
    fn test_json_to_data_value() {
        assert_eq!(json_to_data_value(&json!(5)), DataValue::Num(Num::Int(5)));
        assert_eq!(json_to_data_value(&json!(1.5)), DataValue::Num(Num::Float(1.5)));
        assert_eq!(json_to_data_value(&json!(null)), DataValue::Null);
        assert_eq!(
            json_to_data_value(&json!({"a": 1})),
            DataValue::Str(r#"{"a":1}"#.into())
        );
    }

    #[rstest]
    fn test_open_sqlite_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codec.sqlite");
        let session = CozoSession::open(&path).unwrap();
        session.execute_schema(USERS_SCHEMA).unwrap();
        session
            .insert_json("users", &WireText::new(r#"{"id":1,"name":"alice","age":30}"#))
            .unwrap();
        drop(session);

        let reopened = CozoSession::open(&path).unwrap();
        let rows = reopened.select_json("users", "id", &[WireValue::Int(1)]).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
