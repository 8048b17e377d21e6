mod execute;
mod execute_tests;
mod output;
mod output_tests;

use clap::Args;

/// List the registered codecs
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  json-codec-demo codecs            # Domain type and wire type of every codec
  json-codec-demo codecs -o json    # Same, as JSON")]
pub struct CodecsCmd {}
