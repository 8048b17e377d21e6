//! Output formatting for codecs command results.

use super::execute::CodecsResult;
use crate::output::Outputable;

impl Outputable for CodecsResult {
    fn to_table(&self) -> String {
        if self.codecs.is_empty() {
            return "No codecs registered.".to_string();
        }

        let width = self.codecs.iter().map(|c| c.domain.len()).max().unwrap_or(0);
        let mut lines = vec![format!("Registered codecs ({}):", self.codecs.len())];
        for codec in &self.codecs {
            lines.push(format!("  {:<width$}  <->  {}", codec.domain, codec.wire, width = width));
        }
        lines.join("\n")
    }
}
