/// Error types, one enum per failure category.
///
/// Per-entry failures during a walk never show up here: they are folded into
/// `Notification`s on the walk. Everything below aborts the operation that
/// raised it and carries enough context to render a precise message.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by a walk completion callback.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to load a policy or report config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Also raised for unknown keys, so typos fail loudly.
    #[error("unable to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("policy {path} has no include paths")]
    NoIncludes { path: PathBuf },
}

/// Fatal failure of a walk. Per-path problems are notifications, not errors.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("unable to resolve local hostname: {0}")]
    Hostname(#[source] io::Error),

    #[error("unable to get file info for include path {path}: {source}")]
    IncludeRoot {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn walk thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("walk worker thread panicked")]
    WorkerPanicked,

    #[error("walk was cancelled")]
    Cancelled,

    #[error("walk completion callback failed: {0}")]
    Sink(#[source] SinkError),
}

/// Failure reading or writing a persisted walk file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on walk file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to encode walk {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: bincode::Error,
    },

    #[error("unable to decode walk file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("invalid walk file pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no walk files found for {pattern}")]
    NotFound { pattern: String },
}

/// A comparison precondition failed; no partial report is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("an after walk is required (either hostname, review file and walk path OR at least an after file)")]
    MissingAfter,

    #[error("ID of both walks is the same: {0}")]
    SameId(String),

    #[error("walk versions don't match: before({before}) != after({after})")]
    VersionMismatch { before: u32, after: u32 },

    #[error("walks are from different hosts: {before} != {after}")]
    HostnameMismatch { before: String, after: String },

    #[error("earlier walk indicates it ended ({before_stop}) after later walk has started ({after_start})")]
    NonMonotonic {
        before_stop: String,
        after_start: String,
    },
}

/// A single file pair could not be diffed; recorded as a report error entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FileDiffError {
    #[error("file format versions don't match: before({before}) != after({after})")]
    VersionMismatch { before: u32, after: u32 },

    #[error("file paths don't match: before({before:?}) != after({after:?})")]
    PathMismatch { before: String, after: String },
}

/// The last-known-good baseline could not be resolved, verified, or updated.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("unable to read review file {path}: {source}")]
    ReviewRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse review file {path}: {source}")]
    ReviewParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to write review file {path}: {source}")]
    ReviewWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to encode reviews: {0}")]
    ReviewEncode(#[source] serde_json::Error),

    #[error("unable to load reviewed walk: {0}")]
    Walk(#[from] StoreError),

    #[error("fingerprint method {actual} doesn't match {expected}")]
    MethodMismatch { expected: String, actual: String },

    #[error("undefined fingerprint method")]
    UnknownMethod,

    #[error("empty fingerprint value")]
    EmptyFingerprint,

    #[error("fingerprint {actual} doesn't match {expected}")]
    FingerprintMismatch { expected: String, actual: String },

    #[error("walk ID doesn't match: {actual} (from {reference}) != {expected} (from {review_file})")]
    IdMismatch {
        expected: String,
        actual: String,
        reference: String,
        review_file: PathBuf,
    },
}
