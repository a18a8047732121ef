/// Persisted walk files.
///
/// A walk is written as one `bincode` blob named
/// `<hostname>-<YYYYMMDD-HHMMSS>-fswarden-state.bin`. The fixed-width UTC
/// timestamp makes the lexicographic order of file names chronological, which
/// is what [`latest_walk_path`] relies on.
use crate::error::StoreError;
use crate::fingerprint::fingerprint_bytes;
use crate::model::{Fingerprint, Walk};
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Timestamp layout used in walk file names.
pub const TS_FILE_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Glob matching exactly one [`TS_FILE_FORMAT`] timestamp.
const TS_FILE_GLOB: &str =
    "[0-9][0-9][0-9][0-9][0-9][0-9][0-9][0-9]-[0-9][0-9][0-9][0-9][0-9][0-9]";

/// Suffix shared by every walk file.
pub const WALK_FILE_SUFFIX: &str = "fswarden-state.bin";

/// A walk loaded from disk, with the fingerprint of its exact bytes.
#[derive(Debug, Clone)]
pub struct WalkFile {
    pub path: PathBuf,
    pub walk: Walk,
    pub fingerprint: Fingerprint,
}

/// File name for a walk. A missing hostname or timestamp becomes a `*`
/// wildcard so the result can be used as a glob.
pub fn walk_filename(hostname: Option<&str>, at: Option<DateTime<Utc>>) -> String {
    let host = hostname.filter(|h| !h.is_empty()).unwrap_or("*");
    let ts = at
        .map(|t| t.format(TS_FILE_FORMAT).to_string())
        .unwrap_or_else(|| "*".to_string());
    format!("{host}-{ts}-{WALK_FILE_SUFFIX}")
}

/// Full output path for a walk captured on `hostname` at `at`.
pub fn output_path(dir: &Path, hostname: &str, at: DateTime<Utc>) -> PathBuf {
    dir.join(walk_filename(Some(hostname), Some(at)))
}

pub fn encode_walk(walk: &Walk) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(walk).map_err(|source| StoreError::Encode {
        id: walk.id.clone(),
        source,
    })
}

pub fn decode_walk(bytes: &[u8], path: &Path) -> Result<Walk, StoreError> {
    bincode::deserialize(bytes).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode `walk` to `path` and mark the file read-only.
///
/// Returns the fingerprint of the bytes written, i.e. the value a review
/// entry would pin for this file.
pub fn write_walk(path: &Path, walk: &Walk) -> Result<Fingerprint, StoreError> {
    let bytes = encode_walk(walk)?;
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::write(path, &bytes).map_err(io_err)?;
    let mut perms = fs::metadata(path).map_err(io_err)?.permissions();
    perms.set_readonly(true);
    fs::set_permissions(path, perms).map_err(io_err)?;

    let fingerprint = fingerprint_bytes(&bytes);
    info!(
        "Wrote walk {} ({} files, {} bytes) to {}",
        walk.id,
        walk.files.len(),
        bytes.len(),
        path.display()
    );
    Ok(fingerprint)
}

/// Raw bytes of a walk file and their fingerprint, not yet decoded.
pub fn read_walk_bytes(path: &Path) -> Result<(Vec<u8>, Fingerprint), StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fingerprint = fingerprint_bytes(&bytes);
    Ok((bytes, fingerprint))
}

/// Read and decode a walk file, fingerprinting its raw bytes.
pub fn read_walk(path: &Path) -> Result<WalkFile, StoreError> {
    let (bytes, fingerprint) = read_walk_bytes(path)?;
    let walk = decode_walk(&bytes, path)?;
    debug!("Loaded walk {} from {} ({fingerprint})", walk.id, path.display());
    Ok(WalkFile {
        path: path.to_path_buf(),
        walk,
        fingerprint,
    })
}

/// Path of the newest walk file for `hostname` in `dir`.
///
/// Only names with a full timestamp right after the hostname match, so a
/// host called `web1` never picks up files of `web1-prod`.
pub fn latest_walk_path(hostname: &str, dir: &Path) -> Result<PathBuf, StoreError> {
    let host = if hostname.is_empty() {
        "*".to_string()
    } else {
        Pattern::escape(hostname)
    };
    let pattern = Path::new(&Pattern::escape(&dir.to_string_lossy()))
        .join(format!("{host}-{TS_FILE_GLOB}-{WALK_FILE_SUFFIX}"))
        .to_string_lossy()
        .into_owned();
    let paths = glob::glob(&pattern).map_err(|source| StoreError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    // Unreadable directory entries are skipped like any other non-match.
    let mut names: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    names.sort();
    names.pop().ok_or(StoreError::NotFound { pattern })
}
