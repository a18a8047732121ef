/// Traversal producer: walks each include root with `jwalk`, filters every
/// entry, and queues survivors for the workers.
///
/// Filtering runs inside jwalk's `process_read_dir` hook so that an excluded,
/// too-deep, or foreign-device directory is pruned before jwalk reads it. The
/// verdict rides along on each entry's client state and is turned into a
/// notification here, on the producer thread, so skip notifications come out
/// in traversal order.
use super::notify;
use super::worker::PendingFile;
use crate::error::WalkError;
use crate::model::{Policy, Severity, Walk};
use crate::path::{clean_path, is_excluded, normalize_path, rel_depth};
use crate::platform::{device_id, file_mode};
use crossbeam_channel::Sender;
use jwalk::{Parallelism, WalkDirGeneric};
use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// What to do with one discovered entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Emit,
    Excluded,
    TooDeep,
    StatFailed(String),
    /// Carries the entry's mode bits.
    Irregular(u32),
    OtherDevice,
}

impl Verdict {
    /// Whether a directory with this verdict must not be descended into.
    pub fn prunes(&self) -> bool {
        matches!(self, Self::Excluded | Self::TooDeep | Self::OtherDevice)
    }
}

/// Per-entry state carried through jwalk.
#[derive(Debug, Default)]
pub struct EntryState {
    verdict: Verdict,
    /// Set only when the verdict is `Emit`.
    metadata: Option<Metadata>,
}

type Client = ((), EntryState);

/// An include root, stat'ed before the walk starts.
#[derive(Debug, Clone)]
pub struct IncludeRoot {
    pub path: PathBuf,
    /// Cleaned path as text, used for depth computation and messages.
    pub clean: String,
    pub dev: Option<u64>,
}

/// Stat every include root. Any failure is fatal.
pub fn resolve_roots(include: &[String]) -> Result<Vec<IncludeRoot>, WalkError> {
    include
        .iter()
        .map(|raw| {
            let clean = clean_path(raw);
            let meta = fs::metadata(&clean).map_err(|source| WalkError::IncludeRoot {
                path: clean.clone(),
                source,
            })?;
            Ok(IncludeRoot {
                path: PathBuf::from(&clean),
                dev: device_id(&meta),
                clean,
            })
        })
        .collect()
}

/// Policy checks for the entries below one include root.
#[derive(Debug, Clone)]
pub struct Filter {
    root: String,
    root_dev: Option<u64>,
    exclude: Vec<String>,
    max_depth: u32,
    ignore_irregular: bool,
    cross_device: bool,
}

impl Filter {
    pub fn new(policy: &Policy, root: &IncludeRoot) -> Self {
        Self {
            root: root.clean.clone(),
            root_dev: root.dev,
            exclude: policy.exclude.clone(),
            max_depth: policy.max_directory_depth,
            ignore_irregular: policy.ignore_irregular_files,
            cross_device: policy.walk_cross_device,
        }
    }

    /// Checks that need only the normalised path.
    pub fn check_path(&self, path: &str) -> Option<Verdict> {
        if is_excluded(path, &self.exclude) {
            return Some(Verdict::Excluded);
        }
        if self.max_depth > 0 && rel_depth(&self.root, path) > self.max_depth as usize {
            return Some(Verdict::TooDeep);
        }
        None
    }

    /// Checks that need the entry's own (non-followed) metadata.
    pub fn check_metadata(&self, meta: &Metadata) -> Option<Verdict> {
        if self.ignore_irregular && !meta.is_file() && !meta.is_dir() {
            return Some(Verdict::Irregular(file_mode(meta)));
        }
        if !self.cross_device {
            if let (Some(root), Some(dev)) = (self.root_dev, device_id(meta)) {
                if root != dev {
                    return Some(Verdict::OtherDevice);
                }
            }
        }
        None
    }

    /// Full verdict for one entry. Excluded and too-deep paths are never
    /// stat'ed.
    pub fn classify(&self, path: &Path, is_dir: bool) -> EntryState {
        let norm = normalize_path(&path.to_string_lossy(), is_dir);
        if let Some(verdict) = self.check_path(&norm) {
            return EntryState {
                verdict,
                metadata: None,
            };
        }
        match fs::symlink_metadata(path) {
            Err(e) => EntryState {
                verdict: Verdict::StatFailed(e.to_string()),
                metadata: None,
            },
            Ok(meta) => match self.check_metadata(&meta) {
                Some(verdict) => EntryState {
                    verdict,
                    metadata: None,
                },
                None => EntryState {
                    verdict: Verdict::Emit,
                    metadata: Some(meta),
                },
            },
        }
    }
}

/// Producer state for one walk.
pub struct Traversal<'a> {
    policy: &'a Policy,
    verbose: bool,
    threads: usize,
    cancel: &'a AtomicBool,
    /// Normalised paths already queued, across all roots.
    seen: HashSet<String>,
}

impl<'a> Traversal<'a> {
    pub fn new(policy: &'a Policy, verbose: bool, threads: usize, cancel: &'a AtomicBool) -> Self {
        Self {
            policy,
            verbose,
            threads: threads.max(1),
            cancel,
            seen: HashSet::new(),
        }
    }

    /// Walk the roots in order. Stops early on cancellation or when every
    /// worker has gone away.
    pub fn run(&mut self, roots: &[IncludeRoot], tx: &Sender<PendingFile>, walk: &mut Walk) {
        for root in roots {
            debug!("Walking include path {}", root.clean);
            if self.walk_root(root, tx, walk).is_break() {
                return;
            }
        }
    }

    fn walk_root(
        &mut self,
        root: &IncludeRoot,
        tx: &Sender<PendingFile>,
        walk: &mut Walk,
    ) -> ControlFlow<()> {
        let filter = Arc::new(Filter::new(self.policy, root));
        let hook_filter = Arc::clone(&filter);

        let walker = WalkDirGeneric::<Client>::new(&root.path)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            // One pool per root, released when this root's iterator is done.
            .parallelism(Parallelism::RayonNewPool(self.threads))
            .process_read_dir(move |_depth, _parent, _state, children| {
                for child in children.iter_mut().flatten() {
                    let is_dir = child.file_type.is_dir();
                    child.client_state = hook_filter.classify(&child.path(), is_dir);
                    if is_dir && child.client_state.verdict.prunes() {
                        child.read_children_path = None;
                    }
                }
            });

        for entry in walker {
            if self.cancel.load(Ordering::Relaxed) {
                return ControlFlow::Break(());
            }
            let mut entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let message = format!("failed to walk {path:?}: {err}");
                    notify(walk, Severity::Warning, path, message);
                    continue;
                }
            };

            let raw = entry.path();
            let is_dir = entry.file_type.is_dir();
            let path = normalize_path(&raw.to_string_lossy(), is_dir);
            let mut state = std::mem::take(&mut entry.client_state);
            // The hook did not run for this entry (the include root itself).
            if state.verdict == Verdict::Emit && state.metadata.is_none() {
                state = filter.classify(&raw, is_dir);
            }

            let metadata = match state.verdict {
                Verdict::Emit => match state.metadata {
                    Some(meta) => meta,
                    None => continue,
                },
                verdict => {
                    self.report_skip(walk, &root.clean, path, verdict);
                    continue;
                }
            };

            if !self.seen.insert(path.clone()) {
                let message = format!("skipping {path:?}: already walked from another include path");
                notify(walk, Severity::Warning, path, message);
                continue;
            }

            let pending = PendingFile {
                path: raw,
                key: path,
                name: entry.file_name.to_string_lossy().into_owned(),
                metadata,
            };
            // Blocks while the queue is full.
            if tx.send(pending).is_err() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn report_skip(&self, walk: &mut Walk, root: &str, path: String, verdict: Verdict) {
        match verdict {
            Verdict::Emit => {}
            Verdict::Excluded => {
                if self.verbose {
                    let message = format!("skipping {path:?}: excluded");
                    notify(walk, Severity::Info, path, message);
                }
            }
            Verdict::TooDeep => {
                let message = format!(
                    "skipping {path:?}: more than {} into base path {root:?}",
                    self.policy.max_directory_depth
                );
                notify(walk, Severity::Warning, path, message);
            }
            Verdict::StatFailed(err) => {
                let message = format!("failed to stat {path:?}: {err}");
                notify(walk, Severity::Warning, path, message);
            }
            Verdict::Irregular(mode) => {
                if self.verbose {
                    let message = format!("skipping {path:?}: irregular file (mode: {mode:o})");
                    notify(walk, Severity::Info, path, message);
                }
            }
            Verdict::OtherDevice => {
                let message = format!("skipping {path:?}: file is on different device");
                if self.verbose {
                    notify(walk, Severity::Info, path, message);
                } else {
                    info!("{message}");
                }
            }
        }
    }
}
