mod cli;
mod commands;
mod error;
mod manifest;
mod util;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use cli::{CliOpts, Commands};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let opts = CliOpts::from_iter(wild::args_os());
    init_logging(opts.verbose);

    match opts.cmd {
        Commands::Replicate(args) => commands::replicate(args)?,
        Commands::Hash(args) => commands::hash(args)?,
        Commands::Manifest(args) => commands::manifest(args)?,
        Commands::Verify(args) => commands::verify(args)?,
    };

    Ok(())
}
