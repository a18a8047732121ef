/// Worker side of the walk: turns queued entries into `File` records.
use super::{COUNT_DIRECTORIES, COUNT_FILES, COUNT_FILE_SIZE_SUM, COUNT_HASHES, COUNT_STAT_ERR};
use crate::fingerprint::FileHasher;
use crate::metrics::Counter;
use crate::model::{File, Policy};
use crate::path::is_excluded;
use crate::platform::{file_info, to_stat};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::fs::Metadata;
use std::path::PathBuf;
use tracing::debug;

/// An entry that passed every traversal check.
#[derive(Debug)]
pub struct PendingFile {
    /// Path as discovered, used for I/O.
    pub path: PathBuf,
    /// Normalised path, stored on the record.
    pub key: String,
    pub name: String,
    pub metadata: Metadata,
}

/// A recoverable per-path failure raised while processing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerError {
    pub path: String,
    pub message: String,
}

/// What every worker shares. The file list and counter are the only
/// contended state.
#[derive(Clone, Copy)]
pub struct WorkerShared<'a> {
    pub policy: &'a Policy,
    pub files: &'a Mutex<Vec<File>>,
    pub counter: &'a Counter,
    pub verbose: bool,
}

/// Process entries until the queue is closed and drained.
pub fn run_worker(shared: WorkerShared<'_>, rx: Receiver<PendingFile>, err_tx: Sender<WorkerError>) {
    let mut hasher = FileHasher::new();
    for pending in rx {
        let file = convert(shared.policy, &mut hasher, pending, &err_tx);
        if shared.verbose {
            log_summary(&file);
        }
        record(shared, file);
    }
}

/// Drain the error channel until every worker has dropped its sender.
pub fn collect_errors(rx: Receiver<WorkerError>) -> Vec<WorkerError> {
    rx.iter().collect()
}

/// Regular files within the size limit are hashed unless excluded from
/// hashing.
pub fn should_hash(policy: &Policy, path: &str, meta: &Metadata) -> bool {
    meta.is_file()
        && meta.len() <= policy.max_hash_file_size
        && !is_excluded(path, &policy.exclude_hashing)
}

fn convert(
    policy: &Policy,
    hasher: &mut FileHasher,
    pending: PendingFile,
    err_tx: &Sender<WorkerError>,
) -> File {
    let meta = &pending.metadata;
    let mut file = File::new(pending.key);

    if should_hash(policy, &file.path, meta) {
        match hasher.hash_file(&pending.path) {
            Ok(fp) => file.fingerprint = Some(fp),
            Err(e) => report(err_tx, &file.path, format!("unable to build hash: {e}")),
        }
    }

    file.info = Some(file_info(&pending.name, meta));
    file.stat = to_stat(meta);
    if file.stat.is_none() {
        report(
            err_tx,
            &file.path,
            "unable to get file stat: not supported on this platform".to_string(),
        );
    }
    file
}

fn report(err_tx: &Sender<WorkerError>, path: &str, message: String) {
    // The collector outlives every worker.
    let _ = err_tx.send(WorkerError {
        path: path.to_string(),
        message,
    });
}

/// Append `file` and update the counters under the shared lock.
fn record(shared: WorkerShared<'_>, file: File) {
    let counter = shared.counter;
    let mut files = shared.files.lock();
    if file.is_dir() {
        counter.add(1, COUNT_DIRECTORIES);
    } else {
        counter.add(1, COUNT_FILES);
    }
    counter.add(file.info.as_ref().map_or(0, |i| i.size), COUNT_FILE_SIZE_SUM);
    if file.stat.is_none() {
        counter.add(1, COUNT_STAT_ERR);
    }
    if file.fingerprint.is_some() {
        counter.add(1, COUNT_HASHES);
    }
    files.push(file);
}

fn log_summary(file: &File) {
    let Some(info) = &file.info else {
        return;
    };
    let mut parts = vec![
        format!("size({})", info.size),
        format!("mode({:o})", info.mode),
    ];
    if let Some(mtime) = info.modified {
        parts.push(format!("mtime({mtime})"));
    }
    if let Some(stat) = &file.stat {
        parts.push(format!("uid({})", stat.uid));
        parts.push(format!("gid({})", stat.gid));
        parts.push(format!("inode({})", stat.inode));
    }
    if let Some(fp) = &file.fingerprint {
        parts.push(fp.to_string());
    }
    debug!("{}: {}", file.path, parts.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::fs;

    fn pending(path: &std::path::Path, name: &str) -> PendingFile {
        PendingFile {
            path: path.to_path_buf(),
            key: path.to_string_lossy().into_owned(),
            name: name.to_string(),
            metadata: fs::symlink_metadata(path).unwrap(),
        }
    }

    #[test]
    fn test_should_hash_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let exact = dir.path().join("exact");
        let over = dir.path().join("over");
        fs::write(&exact, vec![0u8; 16]).unwrap();
        fs::write(&over, vec![0u8; 17]).unwrap();
        let policy = Policy {
            max_hash_file_size: 16,
            ..Policy::default()
        };

        let exact_meta = fs::metadata(&exact).unwrap();
        let over_meta = fs::metadata(&over).unwrap();
        assert!(should_hash(&policy, "/x/exact", &exact_meta));
        assert!(!should_hash(&policy, "/x/over", &over_meta));
    }

    #[test]
    fn test_should_hash_skips_dirs_and_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"x").unwrap();
        let policy = Policy {
            max_hash_file_size: 1024,
            exclude_hashing: vec!["/x/nohash/".into()],
            ..Policy::default()
        };
        let dir_meta = fs::metadata(dir.path()).unwrap();
        let file_meta = fs::metadata(&file).unwrap();
        assert!(!should_hash(&policy, "/x/", &dir_meta));
        assert!(!should_hash(&policy, "/x/nohash/f", &file_meta));
        assert!(should_hash(&policy, "/x/f", &file_meta));
    }

    #[test]
    fn test_convert_records_hash_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vanishing");
        fs::write(&path, b"data").unwrap();
        let entry = pending(&path, "vanishing");
        fs::remove_file(&path).unwrap();

        let policy = Policy {
            max_hash_file_size: 1024,
            ..Policy::default()
        };
        let (tx, rx) = unbounded();
        let file = convert(&policy, &mut FileHasher::new(), entry, &tx);
        drop(tx);

        assert!(file.fingerprint.is_none());
        assert_eq!(file.info.as_ref().unwrap().size, 4);
        let errors: Vec<WorkerError> = rx.iter().collect();
        assert!(errors
            .iter()
            .any(|e| e.message.starts_with("unable to build hash")));
    }

    #[test]
    fn test_record_updates_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a");
        fs::write(&path, b"hello").unwrap();
        let policy = Policy {
            max_hash_file_size: 1024,
            ..Policy::default()
        };
        let files = Mutex::new(Vec::new());
        let counter = Counter::new();
        let shared = WorkerShared {
            policy: &policy,
            files: &files,
            counter: &counter,
            verbose: false,
        };

        let (tx, _rx) = unbounded();
        let file = convert(&policy, &mut FileHasher::new(), pending(&path, "a"), &tx);
        record(shared, file);

        assert_eq!(files.lock().len(), 1);
        assert_eq!(counter.get(COUNT_FILES), Some(1));
        assert_eq!(counter.get(COUNT_FILE_SIZE_SUM), Some(5));
        assert_eq!(counter.get(COUNT_HASHES), Some(1));
    }
}
