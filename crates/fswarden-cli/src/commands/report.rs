/// `fswarden report`: compare two walks and optionally pin the newer one.
use anyhow::{Context as _, Result};
use fswarden_core::report::trust::review_section;
use fswarden_core::{Reporter, WalkFile};
use std::io;
use std::path::Path;
use tracing::debug;

use super::Context;
use crate::args::{ReportArgs, ReportMode};
use crate::output;
use crate::prompt;

pub fn execute(ctx: Context, args: ReportArgs) -> Result<()> {
    let mode = args.mode()?;
    debug!("Report mode: {mode:?}");
    let reporter = Reporter::from_config_file(&args.config, ctx.verbose)
        .with_context(|| format!("unable to load report config {}", args.config.display()))?;

    let (before, after) = match &mode {
        ReportMode::Review {
            hostname,
            review_file,
            walk_path,
        } => walks_by_latest(&reporter, hostname, review_file, walk_path)?,
        ReportMode::Files { before, after } => {
            walks_by_files(&reporter, before.as_deref(), after)?
        }
    };

    let report = reporter
        .compare(before.as_ref().map(|b| &b.walk), Some(&after.walk))
        .context("unable to compare walks")?;

    if before.is_none() {
        println!("No before walk found. Using after walk only.");
    }
    print!("{}", output::render_report_summary(&report, reporter.config_path()));
    print!(
        "{}",
        output::render_rule_summary(&report, reporter.config(), ctx.verbose)
    );
    print!("{}", output::render_diff_summary(&report, ctx.verbose));

    let mut names = report.counter.metrics();
    output::sort_report_metrics(&mut names);
    println!("Metrics:");
    print!("{}", output::render_metrics(&report.counter, &names));

    let review_file = match &mode {
        ReportMode::Review { review_file, .. } => Some(review_file.as_path()),
        ReportMode::Files { .. } => None,
    };
    let confirmed = args.update_review
        && prompt::ask_update_reviews(&mut io::stdin().lock(), &mut io::stdout())?;
    if !confirmed {
        println!("not updating reviews file");
        return Ok(());
    }

    let review = reporter
        .update_review(&after, review_file)
        .context("unable to update reviews")?;
    println!("New review section:");
    println!("{}", review_section(&after.walk.hostname, &review)?);
    match review_file {
        Some(path) => println!("Changes written to {:?}", path.display().to_string()),
        None => println!("No reviews file provided so you will have to update it manually."),
    }
    Ok(())
}

/// Last known good from the review file and the newest walk on disk.
fn walks_by_latest(
    reporter: &Reporter,
    hostname: &str,
    review_file: &Path,
    walk_path: &Path,
) -> Result<(Option<WalkFile>, WalkFile)> {
    let before = reporter
        .read_last_good_walk(hostname, review_file)
        .with_context(|| format!("unable to load last good walk for {hostname}"))?;
    let after = reporter
        .read_latest_walk(hostname, walk_path)
        .with_context(|| format!("unable to load latest walk for {hostname}"))?;
    Ok((before, after))
}

fn walks_by_files(
    reporter: &Reporter,
    before: Option<&Path>,
    after: &Path,
) -> Result<(Option<WalkFile>, WalkFile)> {
    let after = reporter
        .read_walk(after)
        .with_context(|| format!("file cannot be read: {}", after.display()))?;
    let before = before
        .map(|path| {
            reporter
                .read_walk(path)
                .with_context(|| format!("file cannot be read: {}", path.display()))
        })
        .transpose()?;
    Ok((before, after))
}
