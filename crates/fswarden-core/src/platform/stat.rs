/// Stat adapter.
///
/// On Unix the raw `stat` fields are read through `MetadataExt`. Elsewhere
/// there is no stat data: [`to_stat`] returns `None` and the scanner records
/// that as an error for the path.
use crate::model::{FileInfo, FileStat};
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use std::fs::Metadata;

/// Portable metadata for an entry called `name`.
pub fn file_info(name: &str, meta: &Metadata) -> FileInfo {
    FileInfo {
        name: CompactString::new(name),
        size: meta.len(),
        mode: file_mode(meta),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
        is_dir: meta.is_dir(),
    }
}

/// Permission and file-type bits.
#[cfg(unix)]
pub fn file_mode(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

/// Permission bits synthesised from the read-only flag.
#[cfg(not(unix))]
pub fn file_mode(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// Device the entry lives on, used to detect mount-point crossings.
#[cfg(unix)]
pub fn device_id(meta: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.dev())
}

#[cfg(not(unix))]
pub fn device_id(_meta: &Metadata) -> Option<u64> {
    None
}

#[cfg(unix)]
pub fn to_stat(meta: &Metadata) -> Option<FileStat> {
    use std::os::unix::fs::MetadataExt;
    Some(FileStat {
        dev: meta.dev(),
        inode: meta.ino(),
        nlink: meta.nlink(),
        mode: meta.mode(),
        uid: meta.uid(),
        gid: meta.gid(),
        rdev: meta.rdev(),
        size: meta.size(),
        blksize: meta.blksize(),
        blocks: meta.blocks(),
        atime: timestamp(meta.atime(), meta.atime_nsec()),
        mtime: timestamp(meta.mtime(), meta.mtime_nsec()),
        ctime: timestamp(meta.ctime(), meta.ctime_nsec()),
    })
}

#[cfg(not(unix))]
pub fn to_stat(_meta: &Metadata) -> Option<FileStat> {
    None
}

#[cfg(unix)]
fn timestamp(secs: i64, nsecs: i64) -> Option<DateTime<Utc>> {
    let nsecs = u32::try_from(nsecs).ok()?;
    DateTime::from_timestamp(secs, nsecs)
}
