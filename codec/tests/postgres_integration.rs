//! Integration tests against a local PostgreSQL server.
//!
//! Run with: cargo test -p json_codec --features postgres-tests
//!
//! Prerequisites:
//! 1. A PostgreSQL server on localhost
//! 2. Create the test database: `createdb -U postgres json_codec_test`

#![cfg(feature = "postgres-tests")]

use json_codec::backend::postgres::PostgresSession;
use json_codec::{
    CodecRegistry, DbError, JsonCodec, JsonStructure, Session, WireText, WireType, WireValue,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};

/// Test connection string for PostgreSQL (local instance)
const PG_CONNECTION: &str = "host=localhost user=postgres dbname=json_codec_test";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: i32,
    name: String,
    age: i32,
}

fn registry() -> CodecRegistry {
    let mut builder = CodecRegistry::builder().with_builtin_codecs().unwrap();
    builder
        .register(WireType::Text, JsonCodec::<User>::new())
        .unwrap();
    builder.build()
}

/// Connect and recreate `table` from `ddl`.
fn session(table: &str, ddl: &str) -> PostgresSession {
    let session = PostgresSession::connect(PG_CONNECTION).expect("PostgreSQL should be reachable");
    session
        .execute_schema(&format!("DROP TABLE IF EXISTS {table}"))
        .unwrap();
    session.execute_schema(ddl).unwrap();
    session
}

#[test]
fn test_row_flow() {
    let registry = registry();
    let session = session(
        "pg_json_row",
        "CREATE TABLE pg_json_row (id int PRIMARY KEY, name text, age int)",
    );

    for user in [
        User { id: 1, name: "alice".into(), age: 30 },
        User { id: 2, name: "bob".into(), age: 35 },
    ] {
        let payload = registry.encode(&user, WireType::Text).unwrap();
        session.insert_json("pg_json_row", &payload).unwrap();
    }

    let rows = session
        .select_json("pg_json_row", "id", &[WireValue::Int(1), WireValue::Int(2)])
        .unwrap();
    let users: Vec<User> = rows
        .iter()
        .map(|row| row.get(0usize, WireType::Text, &registry).unwrap())
        .collect();
    assert_eq!(users[1], User { id: 2, name: "bob".into(), age: 35 });
}

#[test]
fn test_column_flow() {
    let registry = registry();
    let session = session(
        "pg_json_column",
        "CREATE TABLE pg_json_column (id int PRIMARY KEY, json text)",
    );

    let mut alice = Map::new();
    alice.insert("name".into(), json!("alice"));
    let literal = session.quote_literal(
        &registry
            .bind(&JsonStructure::from(alice), WireType::Text)
            .unwrap(),
    );
    session
        .execute_unbound(&format!("INSERT INTO pg_json_column (id, json) VALUES (1, {literal})"))
        .unwrap();

    let mut bob = Map::new();
    bob.insert("name".into(), json!("o'bob"));
    let prepared = session
        .prepare("INSERT INTO pg_json_column (id, json) VALUES ($id, $json)")
        .unwrap();
    let mut bound = prepared.bind();
    bound
        .set("id", 2)
        .unwrap()
        .set_encoded("json", &JsonStructure::from(bob), WireType::Text, &registry)
        .unwrap();
    session.execute(&bound).unwrap();

    let rows = session
        .execute_unbound("SELECT id, json FROM pg_json_column ORDER BY id")
        .unwrap();
    let names: Vec<_> = rows
        .iter()
        .map(|row| {
            let structure: JsonStructure = row.get("json", WireType::Text, &registry).unwrap();
            structure.into_object().unwrap()["name"].clone()
        })
        .collect();
    assert_eq!(names, vec![json!("alice"), json!("o'bob")]);
}

#[test]
fn test_int4_parameter_out_of_range() {
    let session = session("pg_range", "CREATE TABLE pg_range (id int PRIMARY KEY)");
    let prepared = session.prepare("INSERT INTO pg_range (id) VALUES ($id)").unwrap();
    let mut bound = prepared.bind();
    bound.set("id", i64::MAX).unwrap();
    let err = session.execute(&bound).unwrap_err();
    assert!(matches!(err, DbError::ParameterOutOfRange { .. }));
}

#[test]
fn test_parameter_after_backslash_literal_is_bound() {
    let session = session(
        "pg_paths",
        "CREATE TABLE pg_paths (p text, id int PRIMARY KEY, q text)",
    );
    let prepared = session
        .prepare(r"INSERT INTO pg_paths (p, id, q) VALUES ('C:\', $id, 'x')")
        .unwrap();
    assert_eq!(prepared.params(), ["id".to_string()]);

    let mut bound = prepared.bind();
    bound.set("id", 7).unwrap();
    session.execute(&bound).unwrap();

    let rows = session.execute_unbound("SELECT p, id FROM pg_paths").unwrap();
    assert_eq!(rows.rows()[0].get_string("p").unwrap(), r"C:\");
    assert_eq!(rows.rows()[0].get_int("id").unwrap(), 7);
}

#[test]
fn test_json_column_text_returned_verbatim() {
    let registry = registry();
    let session = session(
        "pg_native_json",
        "CREATE TABLE pg_native_json (id int PRIMARY KEY, doc json)",
    );
    session
        .execute_unbound(r#"INSERT INTO pg_native_json VALUES (1, '{"b": 1,  "a": 2}')"#)
        .unwrap();

    let rows = session
        .execute_unbound("SELECT doc FROM pg_native_json")
        .unwrap();
    let raw: WireText = rows.rows()[0].get("doc", WireType::Json, &registry).unwrap();
    assert_eq!(raw.as_str(), r#"{"b": 1,  "a": 2}"#);
}
