//! tasklog CLI
//!
//! This is the main entry point for the tasklog command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Version(args) => {
            commands::notice::run(cli.quiet);
            commands::version::run(args)
        }
        Commands::Upgrade(args) => commands::upgrade::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
///
/// `RUST_LOG` wins over the command-line flags when it is set.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            // Stay quiet by default; update checks must not clutter output
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
