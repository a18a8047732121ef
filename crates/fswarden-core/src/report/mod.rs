/// Report module: the diff/trust engine.
///
/// [`Reporter::compare`] turns two walks into a [`Report`] of added, deleted,
/// modified, and failed entries. Both walks are indexed by normalised path,
/// so the order files were recorded in never matters. The trust chain
/// (review store) lives in [`trust`], the per-field rules in [`diff`].
pub mod diff;
pub mod trust;

use crate::config::load_report_config;
use crate::error::{CompareError, ConfigError, FileDiffError, StoreError, TrustError};
use crate::metrics::Counter;
use crate::model::{File, ReportConfig, Review, Walk};
use crate::path::{is_excluded, normalize_path};
use crate::store::{self, WalkFile};
use diff::{diff_file, TIME_REPORT_FORMAT};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const COUNT_BEFORE_FILES: &str = "before-files";
pub const COUNT_BEFORE_IGNORED: &str = "before-files-ignored";
pub const COUNT_BEFORE_REMOVED: &str = "before-files-removed";
pub const COUNT_BEFORE_MODIFIED: &str = "before-files-modified";
pub const COUNT_BEFORE_DUPLICATE: &str = "before-files-duplicate";
pub const COUNT_DIFF_ERROR: &str = "file-diff-error";
pub const COUNT_AFTER_FILES: &str = "after-files";
pub const COUNT_AFTER_IGNORED: &str = "after-files-ignored";
pub const COUNT_AFTER_CREATED: &str = "after-files-created";
pub const COUNT_AFTER_DUPLICATE: &str = "after-files-duplicate";

/// One entry of a report. Added entries have only `after`, deleted entries
/// only `before`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionData {
    pub before: Option<File>,
    pub after: Option<File>,
    /// Sorted diff lines joined with newlines. Empty for added and deleted
    /// entries.
    pub diff: String,
    pub error: Option<FileDiffError>,
}

impl ActionData {
    fn added(after: File) -> Self {
        Self {
            before: None,
            after: Some(after),
            diff: String::new(),
            error: None,
        }
    }

    fn deleted(before: File) -> Self {
        Self {
            before: Some(before),
            after: None,
            diff: String::new(),
            error: None,
        }
    }

    /// Path of the entry, taken from whichever side is present.
    pub fn path(&self) -> &str {
        self.before
            .as_ref()
            .or(self.after.as_ref())
            .map_or("", |f| f.path.as_str())
    }
}

/// Result of comparing two walks. Every list is sorted by path.
#[derive(Debug)]
pub struct Report<'a> {
    pub added: Vec<ActionData>,
    pub deleted: Vec<ActionData>,
    pub modified: Vec<ActionData>,
    pub errors: Vec<ActionData>,
    pub counter: Counter,
    pub walk_before: Option<&'a Walk>,
    pub walk_after: &'a Walk,
}

impl Report<'_> {
    /// `true` when nothing was added, deleted, modified, or failed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
            && self.errors.is_empty()
    }
}

/// Compares walks under one report config.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: ReportConfig,
    config_path: PathBuf,
    verbose: bool,
}

impl Reporter {
    pub fn new(config: ReportConfig, config_path: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            config,
            config_path: config_path.into(),
            verbose,
        }
    }

    pub fn from_config_file(path: &Path, verbose: bool) -> Result<Self, ConfigError> {
        Ok(Self::new(load_report_config(path)?, path, verbose))
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Read a walk file and fingerprint its bytes.
    pub fn read_walk(&self, path: &Path) -> Result<WalkFile, StoreError> {
        let walk_file = store::read_walk(path)?;
        if self.verbose {
            info!(
                "Loaded file {} with fingerprint: {}",
                path.display(),
                walk_file.fingerprint
            );
        }
        Ok(walk_file)
    }

    /// Read the newest walk for `hostname` under `dir`.
    pub fn read_latest_walk(&self, hostname: &str, dir: &Path) -> Result<WalkFile, StoreError> {
        let path = store::latest_walk_path(hostname, dir)?;
        self.read_walk(&path)
    }

    /// See [`trust::read_last_good_walk`].
    pub fn read_last_good_walk(
        &self,
        hostname: &str,
        review_file: &Path,
    ) -> Result<Option<WalkFile>, TrustError> {
        let walk_file = trust::read_last_good_walk(hostname, review_file)?;
        if self.verbose {
            if let Some(wf) = &walk_file {
                info!(
                    "Last known good walk for {hostname}: {} ({})",
                    wf.walk.id,
                    wf.path.display()
                );
            }
        }
        Ok(walk_file)
    }

    /// See [`trust::update_review`].
    pub fn update_review(
        &self,
        walk_file: &WalkFile,
        review_file: Option<&Path>,
    ) -> Result<Review, TrustError> {
        trust::update_review(walk_file, review_file)
    }

    /// Compare `before` (optional) with `after`.
    ///
    /// Fails without a partial report when `after` is missing, both walks
    /// share an id, or their version, hostname, or time order disagree.
    /// A single file pair that cannot be diffed lands in `errors`.
    pub fn compare<'a>(
        &self,
        before: Option<&'a Walk>,
        after: Option<&'a Walk>,
    ) -> Result<Report<'a>, CompareError> {
        let after = sanity_check(before, after)?;

        let counter = Counter::new();
        let walked_before = before
            .map(|w| index_files(w, &counter, COUNT_BEFORE_DUPLICATE))
            .unwrap_or_default();
        let walked_after = index_files(after, &counter, COUNT_AFTER_DUPLICATE);

        // BTreeMap iteration keeps every list sorted by path.
        let mut added = Vec::new();
        let mut deleted = Vec::new();
        let mut modified = Vec::new();
        let mut errors = Vec::new();

        for (path, fb) in &walked_before {
            counter.add(1, COUNT_BEFORE_FILES);
            if is_excluded(path, &self.config.exclude) {
                counter.add(1, COUNT_BEFORE_IGNORED);
                continue;
            }
            let Some(fa) = walked_after.get(path) else {
                counter.add(1, COUNT_BEFORE_REMOVED);
                deleted.push(ActionData::deleted(fb.clone()));
                continue;
            };
            match diff_file(fb, fa) {
                Ok(diff) if diff.is_empty() => {}
                Ok(diff) => {
                    counter.add(1, COUNT_BEFORE_MODIFIED);
                    modified.push(ActionData {
                        before: Some(fb.clone()),
                        after: Some(fa.clone()),
                        diff,
                        error: None,
                    });
                }
                Err(e) => {
                    counter.add(1, COUNT_DIFF_ERROR);
                    errors.push(ActionData {
                        before: Some(fb.clone()),
                        after: Some(fa.clone()),
                        diff: String::new(),
                        error: Some(e),
                    });
                }
            }
        }

        for (path, fa) in &walked_after {
            counter.add(1, COUNT_AFTER_FILES);
            if is_excluded(path, &self.config.exclude) {
                counter.add(1, COUNT_AFTER_IGNORED);
                continue;
            }
            if !walked_before.contains_key(path) {
                counter.add(1, COUNT_AFTER_CREATED);
                added.push(ActionData::added(fa.clone()));
            }
        }

        debug!(
            "Compared walks: {} added, {} deleted, {} modified, {} errors",
            added.len(),
            deleted.len(),
            modified.len(),
            errors.len()
        );
        Ok(Report {
            added,
            deleted,
            modified,
            errors,
            counter,
            walk_before: before,
            walk_after: after,
        })
    }
}

fn sanity_check<'a>(
    before: Option<&Walk>,
    after: Option<&'a Walk>,
) -> Result<&'a Walk, CompareError> {
    let after = after.ok_or(CompareError::MissingAfter)?;
    let Some(before) = before else {
        return Ok(after);
    };
    if before.id == after.id {
        return Err(CompareError::SameId(before.id.clone()));
    }
    if before.version != after.version {
        return Err(CompareError::VersionMismatch {
            before: before.version,
            after: after.version,
        });
    }
    if before.hostname != after.hostname {
        return Err(CompareError::HostnameMismatch {
            before: before.hostname.clone(),
            after: after.hostname.clone(),
        });
    }
    if before.stop_walk > after.start_walk {
        return Err(CompareError::NonMonotonic {
            before_stop: before.stop_walk.format(TIME_REPORT_FORMAT).to_string(),
            after_start: after.start_walk.format(TIME_REPORT_FORMAT).to_string(),
        });
    }
    Ok(after)
}

/// Index a walk's files by normalised path. A repeated path replaces the
/// earlier record and is counted under `duplicate_counter`.
fn index_files(walk: &Walk, counter: &Counter, duplicate_counter: &str) -> BTreeMap<String, File> {
    let mut index = BTreeMap::new();
    for file in &walk.files {
        let mut f = file.clone();
        f.path = normalize_path(&f.path, f.is_dir());
        if let Some(prev) = index.insert(f.path.clone(), f) {
            counter.add(1, duplicate_counter);
            warn!("walk {} lists {} more than once", walk.id, prev.path);
        }
    }
    index
}
