use std::error::Error;

use json_codec::{JsonStructure, WireType, WireValue};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::JsonColumnCmd;
use crate::commands::{Context, Execute};
use crate::domain::demo_users;
use crate::scripts::{render, script};

pub const TABLE: &str = "json_column";

/// How a row was written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// Encoded value spliced into the statement text
    Literal,
    /// Encoded value bound to a `$json` parameter
    Bound,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertedDocument {
    pub id: i64,
    pub mode: InsertMode,
}

/// One selected row: the column narrowed to an object, plus its raw text.
#[derive(Debug, Clone, Serialize)]
pub struct JsonColumnEntry {
    pub id: i64,
    pub document: Value,
    pub raw: String,
}

/// Result of the json-column command
#[derive(Debug, Serialize)]
pub struct JsonColumnResult {
    pub backend: String,
    pub table: String,
    pub inserted: Vec<InsertedDocument>,
    pub rows: Vec<JsonColumnEntry>,
}

impl Execute for JsonColumnCmd {
    type Output = JsonColumnResult;

    fn execute(self, ctx: &Context<'_>) -> Result<Self::Output, Box<dyn Error>> {
        let session = ctx.session()?;
        let backend = session.backend_name();
        session.execute_schema(script(backend, "json_column_schema")?)?;

        let users = demo_users();
        let mut inserted = Vec::with_capacity(users.len());
        for (index, user) in users.iter().enumerate() {
            let document = user.profile();
            // First document goes inline, the rest through a prepared statement.
            let mode = if index == 0 {
                insert_literal(ctx, user.id, &document)?;
                InsertMode::Literal
            } else {
                insert_bound(ctx, user.id, &document)?;
                InsertMode::Bound
            };
            debug!(table = TABLE, id = user.id, ?mode, "inserted document");
            inserted.push(InsertedDocument {
                id: user.id.into(),
                mode,
            });
        }

        let ids = self
            .ids
            .iter()
            .map(|&id| session.quote_literal(&WireValue::from(id)))
            .collect::<Vec<_>>()
            .join(", ");
        let result = session
            .execute_unbound(&render(script(backend, "json_column_select")?, &[("ids", ids.as_str())]))?;

        let mut rows = Vec::with_capacity(result.len());
        for row in &result {
            let id = row.get_int("id")?;
            let structure: JsonStructure = row.get("json", WireType::Text, ctx.registry)?;
            let object = structure
                .into_object()
                .map_err(|other| format!("Row {}: expected a JSON object, found {}", id, other.kind()))?;
            rows.push(JsonColumnEntry {
                id,
                document: Value::Object(object),
                raw: row.get_string("json")?,
            });
        }

        Ok(JsonColumnResult {
            backend: backend.to_string(),
            table: TABLE.to_string(),
            inserted,
            rows,
        })
    }
}

fn insert_literal(ctx: &Context<'_>, id: i32, document: &JsonStructure) -> Result<(), Box<dyn Error>> {
    let session = ctx.session()?;
    let encoded = ctx.registry.bind(document, WireType::Text)?;
    let id_literal = session.quote_literal(&WireValue::from(id));
    let json_literal = session.quote_literal(&encoded);
    let statement = render(
        script(session.backend_name(), "json_column_insert_literal")?,
        &[("id", id_literal.as_str()), ("json", json_literal.as_str())],
    );
    session.execute_unbound(&statement)?;
    Ok(())
}

fn insert_bound(ctx: &Context<'_>, id: i32, document: &JsonStructure) -> Result<(), Box<dyn Error>> {
    let session = ctx.session()?;
    let prepared = session.prepare(script(session.backend_name(), "json_column_insert")?)?;
    let mut bound = prepared.bind();
    bound
        .set("id", id)?
        .set_encoded("json", document, WireType::Text, ctx.registry)?;
    session.execute(&bound)?;
    Ok(())
}
