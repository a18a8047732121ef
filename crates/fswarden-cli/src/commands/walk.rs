/// `fswarden walk`: capture one walk and write it next to its siblings.
use anyhow::{Context as _, Result};
use fswarden_core::error::SinkError;
use fswarden_core::store::{output_path, write_walk};
use fswarden_core::{Walk, Walker};
use std::path::PathBuf;
use tracing::debug;

use super::Context;
use crate::args::WalkArgs;
use crate::output;

pub fn execute(ctx: Context, args: WalkArgs) -> Result<()> {
    let mut walker = Walker::from_policy_file(&args.policy)
        .with_context(|| format!("unable to load policy {}", args.policy.display()))?
        .with_verbose(ctx.verbose);
    if let Some(workers) = args.workers {
        walker = walker.with_workers(workers);
    }

    let out_dir = args.output.unwrap_or_else(|| PathBuf::from("."));
    debug!("Walk files go to {}", out_dir.display());
    let sink_dir = out_dir.clone();
    walker = walker.with_callback(Box::new(move |walk: &Walk| -> Result<(), SinkError> {
        let path = output_path(&sink_dir, &walk.hostname, walk.start_walk);
        write_walk(&path, walk)?;
        Ok(())
    }));

    let walk = walker.run().context("walk failed")?;

    println!(
        "Walk {} written to {}",
        walk.id,
        output_path(&out_dir, &walk.hostname, walk.start_walk).display()
    );
    if !walk.notifications.is_empty() {
        println!("{} notifications recorded", walk.notifications.len());
    }

    let counter = walker.counter();
    let mut names = counter.metrics();
    names.sort();
    println!("Metrics:");
    print!("{}", output::render_metrics(counter, &names));
    Ok(())
}
