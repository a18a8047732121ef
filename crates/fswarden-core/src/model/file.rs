/// A single file or directory captured by a walk.
///
/// Files are stored in a flat `Vec<File>` on the owning [`Walk`]. Order is
/// whatever order the scanner workers finished in; consumers index by
/// [`File::path`] instead of relying on position.
///
/// [`Walk`]: super::Walk
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format version stamped on every `File`. Compared before diffing two files.
pub const FILE_VERSION: u32 = 1;

/// Hashing algorithm used to build a [`Fingerprint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FingerprintMethod {
    #[default]
    Unknown,
    Sha256,
}

impl FingerprintMethod {
    /// Upper-case label used in reports and review files.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Sha256 => "SHA256",
        }
    }
}

impl fmt::Display for FingerprintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tagged content digest: method plus lowercase hex value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub method: FingerprintMethod,
    pub value: String,
}

impl Fingerprint {
    /// Wrap a hex-encoded SHA-256 digest.
    pub fn sha256(value: impl Into<String>) -> Self {
        Self {
            method: FingerprintMethod::Sha256,
            value: value.into(),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.method, self.value)
    }
}

/// Portable metadata, available whenever the metadata lookup succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Base name only (NOT the full path).
    pub name: CompactString,
    /// Logical size in bytes.
    pub size: u64,
    /// Permission and file-type bits as reported by the platform.
    pub mode: u32,
    /// Last-modified timestamp. `None` if the platform could not report one.
    pub modified: Option<DateTime<Utc>>,
    pub is_dir: bool,
}

/// Low-level stat data. Only produced by the platform stat adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub dev: u64,
    pub inode: u64,
    pub nlink: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: u64,
    pub blksize: u64,
    pub blocks: u64,
    pub atime: Option<DateTime<Utc>>,
    pub mtime: Option<DateTime<Utc>>,
    pub ctime: Option<DateTime<Utc>>,
}

/// One entry of a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub version: u32,
    /// Normalised absolute path: directories carry a trailing separator.
    pub path: String,
    pub info: Option<FileInfo>,
    /// `None` when the stat adapter could not produce stat data.
    pub stat: Option<FileStat>,
    /// `None` for directories, irregular files, files above the hashing size
    /// limit, files excluded from hashing, and files whose hashing failed.
    pub fingerprint: Option<Fingerprint>,
}

impl File {
    /// Create a bare record with only a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            version: FILE_VERSION,
            path: path.into(),
            info: None,
            stat: None,
            fingerprint: None,
        }
    }

    /// `true` if the captured metadata says this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.info.as_ref().is_some_and(|i| i.is_dir)
    }
}
