//! Output formatting for json-column command results.

use super::execute::{InsertMode, JsonColumnResult};
use crate::output::Outputable;

impl Outputable for JsonColumnResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("JSON column ({}, table {})", self.backend, self.table));
        lines.push(String::new());

        lines.push("Inserted:".to_string());
        for doc in &self.inserted {
            let how = match doc.mode {
                InsertMode::Literal => "inline literal",
                InsertMode::Bound => "bound parameter",
            };
            lines.push(format!("  {} via {}", doc.id, how));
        }
        lines.push(String::new());

        if self.rows.is_empty() {
            lines.push("No rows matched.".to_string());
            return lines.join("\n");
        }

        lines.push(format!("Selected {} row(s):", self.rows.len()));
        for entry in &self.rows {
            let name = entry.document.get("name").and_then(|n| n.as_str()).unwrap_or("?");
            lines.push(format!("  {}: {}", entry.id, name));
            lines.push(format!("    raw {}", entry.raw));
        }

        lines.join("\n")
    }
}
