//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database to run the demos against
    ///
    /// `:memory:`, `sqlite:///path`, a plain file path, or `postgres://...`.
    /// If not specified, falls back to:
    ///   1. .json_codec.json (current directory, then home directory)
    ///   2. the DATABASE_URL environment variable
    ///   3. an in-memory store
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_global_options_after_subcommand() {
        let args =
            Args::try_parse_from(["json-codec-demo", "codecs", "--db", ":memory:", "-o", "json", "-v"])
                .unwrap();
        assert_eq!(args.db.as_deref(), Some(":memory:"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.verbose);
    }

    #[rstest]
    fn test_defaults() {
        let args = Args::try_parse_from(["json-codec-demo", "codecs"]).unwrap();
        assert_eq!(args.db, None);
        assert_eq!(args.format, OutputFormat::Table);
        assert!(!args.verbose);
    }

    #[rstest]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["json-codec-demo"]).is_err());
    }

    #[rstest]
    fn test_invalid_format_rejected() {
        assert!(Args::try_parse_from(["json-codec-demo", "codecs", "-o", "yaml"]).is_err());
    }
}
