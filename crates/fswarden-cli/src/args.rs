/// Command-line argument definitions using clap.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

/// File-system integrity monitor.
///
/// `walk` captures a hashed inventory of the paths named by a policy.
/// `report` compares two inventories and can pin the newer one as the
/// last known good state for its host.
#[derive(Parser, Debug)]
#[command(name = "fswarden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Record skipped entries and print per-file diffs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk the include paths of a policy and write one walk file
    Walk(WalkArgs),

    /// Compare two walks and optionally update the review file
    Report(ReportArgs),
}

// ============================================================================
// Walk command
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct WalkArgs {
    /// Policy file to use (TOML)
    #[arg(short = 'c', long = "policy")]
    pub policy: PathBuf,

    /// Directory the walk file is written to [default: current directory]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of hashing threads [default: number of CPUs]
    #[arg(long)]
    pub workers: Option<usize>,
}

// ============================================================================
// Report command
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Report config file to use (TOML)
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    /// Directory to search for the latest walk of --hostname
    #[arg(long)]
    pub walk_path: Option<PathBuf>,

    /// Review file holding the last known good walks; must be writable
    #[arg(long)]
    pub review_file: Option<PathBuf>,

    /// Host to review the differences for
    #[arg(long)]
    pub hostname: Option<String>,

    /// Walk file to compare against, typically the last known good one
    #[arg(long)]
    pub before_file: Option<PathBuf>,

    /// Walk file to compare with the before state
    #[arg(long)]
    pub after_file: Option<PathBuf>,

    /// Ask whether to pin the after walk as last known good
    #[arg(long)]
    pub update_review: bool,
}

/// How the two sides of a report are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportMode {
    /// Last known good from the review file against the latest walk on disk.
    Review {
        hostname: String,
        review_file: PathBuf,
        walk_path: PathBuf,
    },
    /// Explicit walk files. Without a before file the report lists every
    /// after entry as added.
    Files {
        before: Option<PathBuf>,
        after: PathBuf,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("[hostname review-file walk-path] and [[before-file] after-file] are mutually exclusive")]
    MixedModes,

    #[error("--hostname, --review-file and --walk-path must be given together (missing: {missing})")]
    IncompleteReview { missing: String },

    #[error("--before-file needs --after-file")]
    BeforeWithoutAfter,

    #[error("either [hostname review-file walk-path] OR [[before-file] after-file] need to be specified")]
    NoMode,
}

impl ReportArgs {
    /// Select exactly one way of finding the walks, before any I/O.
    pub fn mode(&self) -> Result<ReportMode, UsageError> {
        let review_flags = [
            ("--hostname", self.hostname.is_some()),
            ("--review-file", self.review_file.is_some()),
            ("--walk-path", self.walk_path.is_some()),
        ];
        let any_review = review_flags.iter().any(|(_, set)| *set);
        let any_files = self.before_file.is_some() || self.after_file.is_some();

        if any_review && any_files {
            return Err(UsageError::MixedModes);
        }

        if any_review {
            let missing: Vec<&str> = review_flags
                .iter()
                .filter(|(_, set)| !set)
                .map(|(name, _)| *name)
                .collect();
            return match (&self.hostname, &self.review_file, &self.walk_path) {
                (Some(hostname), Some(review_file), Some(walk_path)) => Ok(ReportMode::Review {
                    hostname: hostname.clone(),
                    review_file: review_file.clone(),
                    walk_path: walk_path.clone(),
                }),
                _ => Err(UsageError::IncompleteReview {
                    missing: missing.join(", "),
                }),
            };
        }

        match (&self.before_file, &self.after_file) {
            (before, Some(after)) => Ok(ReportMode::Files {
                before: before.clone(),
                after: after.clone(),
            }),
            (Some(_), None) => Err(UsageError::BeforeWithoutAfter),
            (None, None) => Err(UsageError::NoMode),
        }
    }
}
