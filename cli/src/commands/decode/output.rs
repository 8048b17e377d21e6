//! Output formatting for decode command results.

use super::execute::DecodeResult;
use crate::output::Outputable;

impl Outputable for DecodeResult {
    fn to_table(&self) -> String {
        if self.ok {
            let value = self
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            return format!("Decoded with {} codec ({}):\n  {}", self.codec, self.wire, value);
        }

        format!(
            "Rejected by {} codec ({}): {} fault\n  {}",
            self.codec,
            self.wire,
            self.fault.as_deref().unwrap_or("unknown"),
            self.message.as_deref().unwrap_or_default()
        )
    }
}
