//! Log output for the demo binary.
//!
//! Logs go to stderr so command output on stdout stays parseable.
//! `RUST_LOG` takes precedence over the `--verbose` default.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests) is not an error.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
