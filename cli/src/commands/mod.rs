//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - `execute.rs` producing a serializable result
//! - `output.rs` rendering that result as a table

mod codecs;
mod decode;
mod json_column;
mod json_row;

pub use codecs::CodecsCmd;
pub use decode::DecodeCmd;
pub use json_column::JsonColumnCmd;
pub use json_row::JsonRowCmd;

use clap::Subcommand;
use json_codec::{CodecRegistry, Session};
use std::error::Error;

use crate::output::{OutputFormat, Outputable};

/// What a command runs against.
///
/// Offline commands get no session.
pub struct Context<'a> {
    pub registry: &'a CodecRegistry,
    session: Option<&'a dyn Session>,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a CodecRegistry, session: Option<&'a dyn Session>) -> Self {
        Self { registry, session }
    }

    pub fn session(&self) -> Result<&'a dyn Session, Box<dyn Error>> {
        self.session
            .ok_or_else(|| "This command needs a database session".into())
    }
}

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, ctx: &Context<'_>) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store users as whole-row JSON and read them back
    JsonRow(JsonRowCmd),

    /// Store JSON documents in a text column and read them back
    JsonColumn(JsonColumnCmd),

    /// List the registered codecs
    Codecs(CodecsCmd),

    /// Decode a payload with one of the demo codecs
    Decode(DecodeCmd),
}

impl Command {
    /// Whether the command talks to the database.
    pub fn needs_session(&self) -> bool {
        matches!(self, Command::JsonRow(_) | Command::JsonColumn(_))
    }

    /// Execute the command and return formatted output
    pub fn run(self, ctx: &Context<'_>, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::JsonRow(cmd) => {
                let result = cmd.execute(ctx)?;
                Ok(result.format(format))
            }
            Command::JsonColumn(cmd) => {
                let result = cmd.execute(ctx)?;
                Ok(result.format(format))
            }
            Command::Codecs(cmd) => {
                let result = cmd.execute(ctx)?;
                Ok(result.format(format))
            }
            Command::Decode(cmd) => {
                let result = cmd.execute(ctx)?;
                Ok(result.format(format))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::demo_registry;
    use rstest::rstest;

    #[rstest]
    fn test_offline_context_has_no_session() {
        let registry = demo_registry().unwrap();
        let ctx = Context::new(&registry, None);
        let err = ctx.session().err().unwrap();
        assert!(err.to_string().contains("needs a database session"));
    }

    #[rstest]
    fn test_offline_command_runs_without_session() {
        let registry = demo_registry().unwrap();
        let ctx = Context::new(&registry, None);
        let output = Command::Codecs(CodecsCmd {})
            .run(&ctx, OutputFormat::Table)
            .unwrap();
        assert!(output.contains("User"));
    }

    #[rstest]
    fn test_session_commands() {
        assert!(Command::JsonRow(JsonRowCmd { ids: vec![1] }).needs_session());
        assert!(!Command::Codecs(CodecsCmd {}).needs_session());
    }
}
