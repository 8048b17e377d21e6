use std::error::Error;

use json_codec::{CodecError, JsonStructure, WireText, WireType};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{CodecChoice, DecodeCmd};
use crate::commands::{Context, Execute};
use crate::domain::User;

/// Result of the decode command.
///
/// A rejected payload is a result, not an error; a missing codec is an error.
#[derive(Debug, Serialize)]
pub struct DecodeResult {
    pub codec: String,
    pub wire: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Execute for DecodeCmd {
    type Output = DecodeResult;

    fn execute(self, ctx: &Context<'_>) -> Result<Self::Output, Box<dyn Error>> {
        let wire = WireType::from(self.wire);
        let registry = ctx.registry;
        let payload = self.payload.as_str();

        let decoded = match self.codec {
            CodecChoice::User => registry.decode::<User>(payload, wire).map(|v| serde_json::to_value(v)),
            CodecChoice::Structure => registry
                .decode::<JsonStructure>(payload, wire)
                .map(|v| serde_json::to_value(v)),
            CodecChoice::Raw => registry
                .decode::<WireText>(payload, wire)
                .map(|v| serde_json::to_value(v)),
        };

        let mut result = DecodeResult {
            codec: self.codec.name().to_string(),
            wire: wire.to_string(),
            ok: false,
            value: None,
            fault: None,
            message: None,
        };

        match decoded {
            Ok(value) => {
                result.ok = true;
                result.value = Some(value?);
            }
            Err(CodecError::MalformedPayload {
                domain,
                fault,
                message,
            }) => {
                warn!(domain, %fault, "payload rejected");
                result.fault = Some(fault.to_string());
                result.message = Some(message);
            }
            Err(other) => return Err(other.into()),
        }
        Ok(result)
    }
}
