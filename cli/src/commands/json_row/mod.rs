mod cli_tests;
mod execute;
mod output;

use clap::Args;

/// Store users as whole-row JSON and read them back
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  json-codec-demo json-row                   # Insert alice and bob, read both back
  json-codec-demo json-row --ids 2           # Read back bob only
  json-codec-demo json-row --db ./demo.db    # Persist to a SQLite-backed store")]
pub struct JsonRowCmd {
    /// Ids of the rows to read back (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 2])]
    pub ids: Vec<i32>,
}
