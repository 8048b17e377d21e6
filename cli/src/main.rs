use clap::Parser;
use json_codec::{Session, SessionConfig};
use tracing::info;

mod cli;
mod commands;
mod domain;
mod logging;
pub mod output;
mod scripts;
#[macro_use]
mod test_macros;
use cli::Args;
use commands::Context;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let registry = domain::demo_registry()?;

    let session = if args.command.needs_session() {
        let session = SessionConfig::resolve(args.db.as_deref())?.connect()?;
        info!(backend = session.backend_name(), "session opened");
        Some(session)
    } else {
        None
    };

    let ctx = Context::new(&registry, session.as_deref());
    let output = args.command.run(&ctx, args.format)?;
    println!("{}", output);
    Ok(())
}
