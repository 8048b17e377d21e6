use std::error::Error;

use serde::Serialize;

use super::CodecsCmd;
use crate::commands::{Context, Execute};

/// One registry key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodecEntry {
    pub domain: String,
    pub wire: String,
}

/// Result of the codecs command
#[derive(Debug, Default, Serialize)]
pub struct CodecsResult {
    pub codecs: Vec<CodecEntry>,
}

impl Execute for CodecsCmd {
    type Output = CodecsResult;

    fn execute(self, ctx: &Context<'_>) -> Result<Self::Output, Box<dyn Error>> {
        let codecs = ctx
            .registry
            .entries()
            .into_iter()
            .map(|(domain, wire)| CodecEntry {
                domain: domain.to_string(),
                wire: wire.to_string(),
            })
            .collect();
        Ok(CodecsResult { codecs })
    }
}
