/// Data model for fswarden inventories.
///
/// Re-exports the walk record, its per-file entries, the policies that
/// drive walks and reports, and the review records of the trust chain.
pub mod file;
pub mod policy;
pub mod review;
pub mod walk;

pub use file::{File, FileInfo, FileStat, Fingerprint, FingerprintMethod, FILE_VERSION};
pub use policy::{Policy, ReportConfig};
pub use review::{Review, Reviews};
pub use walk::{Notification, Severity, Walk, WALK_VERSION};
