mod cli_tests;
mod execute;
mod output;

use clap::{Args, ValueEnum};
use json_codec::WireType;

/// Which demo codec to decode with.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum CodecChoice {
    /// The strict `User` codec
    User,
    /// Any JSON object or array
    Structure,
    /// Syntax check only, text returned as-is
    Raw,
}

impl CodecChoice {
    pub fn name(self) -> &'static str {
        match self {
            CodecChoice::User => "user",
            CodecChoice::Structure => "structure",
            CodecChoice::Raw => "raw",
        }
    }
}

/// Column type the payload was read from.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum WireChoice {
    Text,
    Json,
}

impl From<WireChoice> for WireType {
    fn from(choice: WireChoice) -> Self {
        match choice {
            WireChoice::Text => WireType::Text,
            WireChoice::Json => WireType::Json,
        }
    }
}

/// Decode a payload with one of the demo codecs
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  json-codec-demo decode -c user '{\"id\":2,\"name\":\"bob\",\"age\":35}'
  json-codec-demo decode -c user '{\"id\":2,\"name\":\"bob\"}'     # shape fault: missing age
  json-codec-demo decode -c structure -w json '[1, 2, 3]'
  json-codec-demo decode -c raw 'not json'                        # syntax fault")]
pub struct DecodeCmd {
    /// Codec to decode with
    #[arg(short, long, value_enum)]
    pub codec: CodecChoice,

    /// Column type the payload came from
    #[arg(short, long, value_enum, default_value_t = WireChoice::Text)]
    pub wire: WireChoice,

    /// The JSON payload
    pub payload: String,
}
