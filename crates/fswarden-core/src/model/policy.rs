/// Walk policy and report configuration.
///
/// Both are decoded from TOML by [`crate::config`] and are immutable once
/// loaded. Unknown keys are rejected so a typo never silently widens a walk.
use serde::{Deserialize, Serialize};

/// Which paths a walk includes, excludes, and hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Policy {
    pub version: u32,
    /// Absolute root paths to walk. Should not nest.
    pub include: Vec<String>,
    /// Exclusion prefixes. A trailing separator scopes a prefix to a directory.
    pub exclude: Vec<String>,
    /// Paths walked and recorded but never hashed. Same prefix semantics.
    pub exclude_hashing: Vec<String>,
    /// Regular files larger than this many bytes are not hashed.
    pub max_hash_file_size: u64,
    /// Descend into mount points on a different device than the include root.
    pub walk_cross_device: bool,
    /// Skip anything that is neither a regular file nor a directory.
    pub ignore_irregular_files: bool,
    /// Maximum depth below an include root. 0 means unlimited.
    pub max_directory_depth: u32,
}

/// Settings that shape a comparison report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub version: u32,
    /// Paths dropped from the report, with the same prefix semantics as
    /// [`Policy::exclude`].
    pub exclude: Vec<String>,
}
