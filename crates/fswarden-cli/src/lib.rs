/// fswarden command-line frontend.
///
/// Argument parsing, the walk-file sink, terminal rendering of reports and
/// metrics, and the confirmation prompt. All walking and comparing happens
/// in `fswarden-core`.
pub mod args;
pub mod commands;
pub mod output;
pub mod prompt;

use anyhow::Result;
use args::{Cli, Commands};

pub use args::{ReportMode, UsageError};

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Walk(args) => commands::walk::execute(ctx, args),
        Commands::Report(args) => commands::report::execute(ctx, args),
    }
}
