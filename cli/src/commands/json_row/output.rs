//! Output formatting for json-row command results.

use super::execute::JsonRowResult;
use crate::output::Outputable;

impl Outputable for JsonRowResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("JSON rows ({}, table {})", self.backend, self.table));
        lines.push(String::new());

        lines.push("Inserted:".to_string());
        for payload in &self.inserted {
            lines.push(format!("  {}", payload));
        }
        lines.push(String::new());

        if self.rows.is_empty() {
            lines.push("No rows matched.".to_string());
            return lines.join("\n");
        }

        lines.push(format!("Selected {} row(s):", self.rows.len()));
        for entry in &self.rows {
            lines.push(format!("  {}", entry.user));
            lines.push(format!("    [json] {}", entry.json));
        }

        lines.join("\n")
    }
}
