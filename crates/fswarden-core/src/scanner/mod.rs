/// Scanner module: the walk engine.
///
/// A single traversal producer per include root feeds a bounded queue that a
/// pool of worker threads drains. Each worker owns its own hasher and only
/// takes the shared lock to append a finished `File` and bump the counters.
/// Per-path worker failures go to a separate collector thread and are folded
/// into ERROR notifications once every worker has finished.
///
/// ```text
///   jwalk (per root) ──► traverse ──► bounded(64) ──► worker × N ──► Mutex<Vec<File>>
///                          │                            │
///                          ▼                            ▼
///                    notifications                 error collector
/// ```
pub mod traverse;
pub mod worker;

use crate::config::load_policy;
use crate::error::{ConfigError, SinkError, WalkError};
use crate::metrics::Counter;
use crate::model::{File, Policy, Severity, Walk};
use chrono::Utc;
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};
use traverse::Traversal;
use uuid::Uuid;
use worker::{PendingFile, WorkerError, WorkerShared};

/// Counter names reported by a walk.
pub const COUNT_FILES: &str = "file-count";
pub const COUNT_DIRECTORIES: &str = "dir-count";
pub const COUNT_FILE_SIZE_SUM: &str = "file-size-sum";
pub const COUNT_STAT_ERR: &str = "file-stat-errors";
pub const COUNT_HASHES: &str = "file-hash-count";

/// Maximum number of emitted entries waiting for a worker. The producer
/// blocks once the queue is full.
pub const WORK_QUEUE_CAPACITY: usize = 64;

/// Receives the finished walk. Its error is returned from [`Walker::run`].
pub type WalkCallback = Box<dyn FnMut(&Walk) -> Result<(), SinkError> + Send>;

/// Walks the include roots of one policy into a [`Walk`].
pub struct Walker {
    policy: Policy,
    workers: usize,
    verbose: bool,
    counter: Counter,
    walk_callback: Option<WalkCallback>,
    cancel_flag: Arc<AtomicBool>,
}

impl Walker {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            workers: num_cpus::get(),
            verbose: false,
            counter: Counter::new(),
            walk_callback: None,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load the policy at `path` and build a walker for it.
    pub fn from_policy_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(load_policy(path)?))
    }

    /// Override the number of hashing worker threads (at least one).
    ///
    /// The traversal of each include root also gets its own rayon pool of
    /// the same size, so a walk runs up to twice this many threads plus the
    /// error collector. The pool is dropped before the next root starts.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Record INFO notifications for skipped entries and log a summary of
    /// every processed file.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_callback(mut self, callback: WalkCallback) -> Self {
        self.walk_callback = Some(callback);
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Counters of the most recent [`run`](Self::run). Each run starts from
    /// zero.
    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    /// Shared flag that stops a running walk between entries when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }

    /// Walk every include root, hand the finished walk to the callback, and
    /// return it.
    ///
    /// Fails only when the hostname cannot be resolved, an include root
    /// cannot be stat'ed, a thread cannot be spawned or panics, the walk is
    /// cancelled, or the callback fails. Everything else becomes a
    /// notification on the walk.
    pub fn run(&mut self) -> Result<Walk, WalkError> {
        self.counter = Counter::new();
        let hostname = hostname::get()
            .map_err(WalkError::Hostname)?
            .to_string_lossy()
            .into_owned();
        let roots = traverse::resolve_roots(&self.policy.include)?;

        let mut walk = Walk::new(
            Uuid::new_v4().to_string(),
            hostname,
            self.policy.clone(),
            Utc::now(),
        );
        info!(
            "Starting walk {} on {} with {} workers over {} include paths",
            walk.id,
            walk.hostname,
            self.workers,
            roots.len()
        );

        let files: Mutex<Vec<File>> = Mutex::new(Vec::new());
        let (file_tx, file_rx) = bounded::<PendingFile>(WORK_QUEUE_CAPACITY);
        let (err_tx, err_rx) = bounded::<WorkerError>(WORK_QUEUE_CAPACITY);
        let shared = WorkerShared {
            policy: &self.policy,
            files: &files,
            counter: &self.counter,
            verbose: self.verbose,
        };
        let mut traversal = Traversal::new(
            &self.policy,
            self.verbose,
            self.workers,
            &self.cancel_flag,
        );

        let worker_errors = thread::scope(|s| -> Result<Vec<WorkerError>, WalkError> {
            let collector = thread::Builder::new()
                .name("fswarden-errors".into())
                .spawn_scoped(s, move || worker::collect_errors(err_rx))
                .map_err(WalkError::Spawn)?;

            let mut handles = Vec::with_capacity(self.workers);
            for i in 0..self.workers {
                let rx = file_rx.clone();
                let tx = err_tx.clone();
                let handle = thread::Builder::new()
                    .name(format!("fswarden-worker-{i}"))
                    .spawn_scoped(s, move || worker::run_worker(shared, rx, tx))
                    .map_err(WalkError::Spawn)?;
                handles.push(handle);
            }
            drop(file_rx);
            drop(err_tx);

            traversal.run(&roots, &file_tx, &mut walk);
            // Closing the queue lets the workers drain and exit.
            drop(file_tx);

            let mut panicked = false;
            for handle in handles {
                panicked |= handle.join().is_err();
            }
            let errors = collector.join().map_err(|_| WalkError::WorkerPanicked)?;
            if panicked {
                return Err(WalkError::WorkerPanicked);
            }
            Ok(errors)
        })?;

        if self.cancel_flag.load(Ordering::Relaxed) {
            info!("Walk {} cancelled", walk.id);
            return Err(WalkError::Cancelled);
        }

        for werr in worker_errors {
            notify(&mut walk, Severity::Error, werr.path, werr.message);
        }
        walk.files = files.into_inner();
        walk.stop_walk = Utc::now();
        info!(
            "Walk {} complete: {} files, {} notifications in {}s",
            walk.id,
            walk.files.len(),
            walk.notifications.len(),
            (walk.stop_walk - walk.start_walk).num_seconds()
        );

        if let Some(callback) = self.walk_callback.as_mut() {
            callback(&walk).map_err(WalkError::Sink)?;
        }
        Ok(walk)
    }
}

/// Append a notification to `walk` and mirror it to the log.
pub(crate) fn notify(walk: &mut Walk, severity: Severity, path: String, message: String) {
    match severity {
        Severity::Error => error!("{path}: {message}"),
        Severity::Warning => warn!("{path}: {message}"),
        Severity::Info | Severity::Unknown => info!("{path}: {message}"),
    }
    walk.add_notification(severity, path, message);
}
