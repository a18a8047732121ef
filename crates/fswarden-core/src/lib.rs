/// fswarden core: walking, fingerprinting, and change review.
///
/// This crate contains all business logic with zero terminal UI dependencies.
/// It is designed to be reusable across different frontends (CLI, daemon, TUI).
///
/// # Modules
///
/// - [`model`]: Inventory (`Walk`) data model, policies, and review records.
/// - [`path`]: Path normalisation and prefix exclusion shared by both engines.
/// - [`fingerprint`]: SHA-256 content fingerprints for files and blobs.
/// - [`metrics`]: Thread-safe named counters.
/// - [`platform`]: Stat adapter turning `std::fs::Metadata` into `FileStat`.
/// - [`config`]: TOML decoding of policies and report configs.
/// - [`scanner`]: The walk engine: parallel traversal, hashing, aggregation.
/// - [`store`]: Persisted walk files: naming, encoding, latest lookup.
/// - [`report`]: The diff/trust engine: comparisons and review records.
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod metrics;
pub mod model;
pub mod path;
pub mod platform;
pub mod report;
pub mod scanner;
pub mod store;

pub use error::{CompareError, ConfigError, FileDiffError, StoreError, TrustError, WalkError};
pub use metrics::Counter;
pub use model::{
    File, FileInfo, FileStat, Fingerprint, FingerprintMethod, Notification, Policy, ReportConfig,
    Review, Reviews, Severity, Walk,
};
pub use report::{ActionData, Report, Reporter};
pub use scanner::Walker;
pub use store::WalkFile;
