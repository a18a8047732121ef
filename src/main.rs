//! fswarden: file-system integrity monitor.
//!
//! Thin binary entry point. All logic lives in the `fswarden-core`
//! and `fswarden-cli` crates.

use clap::Parser;
use fswarden_cli::args::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so reports on stdout stay clean.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    fswarden_cli::run(cli)
}
