mod execute;
mod execute_tests;
mod output;

use clap::Args;

/// Store JSON documents in a text column and read them back
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  json-codec-demo json-column                # alice inline, bob as a bound parameter
  json-codec-demo json-column --ids 1        # Read back alice only
  json-codec-demo json-column -o json        # Decoded objects as JSON")]
pub struct JsonColumnCmd {
    /// Ids of the rows to read back (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 2])]
    pub ids: Vec<i32>,
}
