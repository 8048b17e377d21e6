use std::error::Error;

use json_codec::{DbError, WireType, WireValue};
use serde::Serialize;
use tracing::debug;

use super::JsonRowCmd;
use crate::commands::{Context, Execute};
use crate::domain::{User, demo_users};
use crate::scripts::{render, script};

pub const TABLE: &str = "json_row";

/// One selected row: the JSON text as stored and the user decoded from it.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRowEntry {
    pub json: String,
    pub user: User,
}

/// Result of the json-row command
#[derive(Debug, Serialize)]
pub struct JsonRowResult {
    pub backend: String,
    pub table: String,
    /// Encoded payloads, in insertion order
    pub inserted: Vec<String>,
    pub rows: Vec<JsonRowEntry>,
}

impl Execute for JsonRowCmd {
    type Output = JsonRowResult;

    fn execute(self, ctx: &Context<'_>) -> Result<Self::Output, Box<dyn Error>> {
        let session = ctx.session()?;
        let backend = session.backend_name();
        session.execute_schema(script(backend, "json_row_schema")?)?;

        let users = demo_users();
        let demo_ids = users
            .iter()
            .map(|u| session.quote_literal(&WireValue::from(u.id)))
            .collect::<Vec<_>>()
            .join(", ");
        session.execute_unbound(&render(
            script(backend, "json_row_clear")?,
            &[("ids", demo_ids.as_str())],
        ))?;

        let mut inserted = Vec::with_capacity(users.len());
        for user in &users {
            let payload = ctx.registry.encode(user, WireType::Text)?;
            debug!(table = TABLE, payload = payload.as_str(), "inserting row");
            session.insert_json(TABLE, &payload)?;
            inserted.push(payload.into_string());
        }

        let keys: Vec<WireValue> = self.ids.iter().map(|&id| WireValue::from(id)).collect();
        let rows = session
            .select_json(TABLE, "id", &keys)?
            .iter()
            .map(|row| {
                Ok(JsonRowEntry {
                    json: row.get_string(0usize)?,
                    user: row.get(0usize, WireType::Text, ctx.registry)?,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(JsonRowResult {
            backend: backend.to_string(),
            table: TABLE.to_string(),
            inserted,
            rows,
        })
    }
}
