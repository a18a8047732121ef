/// Field-level diff rules for one file present in both walks.
///
/// Each rule is a small pure function returning the diff lines it owns. The
/// two suppression rules live in [`fingerprint_diffs`] (a fingerprint that
/// only appears is not a change) and [`ctime_diff`] (a ctime change that
/// mirrors the mtime change is not reported twice).
use crate::error::FileDiffError;
use crate::model::{File, FileInfo, FileStat, Fingerprint};
use chrono::{DateTime, Utc};

/// Timestamp layout used in diff lines and report headers.
pub const TIME_REPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

fn format_ts(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t.format(TIME_REPORT_FORMAT).to_string(),
        None => "none".to_string(),
    }
}

/// `"<before> => <after>"`, or an empty string when the timestamps are equal.
pub fn timestamp_diff(before: Option<DateTime<Utc>>, after: Option<DateTime<Utc>>) -> String {
    if before == after {
        return String::new();
    }
    format!("{} => {}", format_ts(before), format_ts(after))
}

/// Only reports a fingerprint that disappeared or changed. Method and value
/// changes are reported separately.
pub fn fingerprint_diffs(before: Option<&Fingerprint>, after: Option<&Fingerprint>) -> Vec<String> {
    let Some(fb) = before else {
        return Vec::new();
    };
    let Some(fa) = after else {
        return vec![format!("fingerprint: {} => ", fb.value)];
    };
    let mut diffs = Vec::new();
    if fb.method != fa.method {
        diffs.push(format!("fingerprint-method: {} => {}", fb.method, fa.method));
    }
    if fb.value != fa.value {
        diffs.push(format!("fingerprint: {} => {}", fb.value, fa.value));
    }
    diffs
}

pub fn info_diffs(before: Option<&FileInfo>, after: Option<&FileInfo>) -> Vec<String> {
    let (b, a) = match (before, after) {
        (None, None) => return Vec::new(),
        (Some(_), None) => return vec!["info: present => missing".to_string()],
        (None, Some(_)) => return vec!["info: missing => present".to_string()],
        (Some(b), Some(a)) => (b, a),
    };
    let mut diffs = Vec::new();
    if b.name != a.name {
        diffs.push(format!("name: {:?} => {:?}", b.name.as_str(), a.name.as_str()));
    }
    if b.size != a.size {
        diffs.push(format!("size: {} => {}", b.size, a.size));
    }
    if b.mode != a.mode {
        diffs.push(format!("mode: {:o} => {:o}", b.mode, a.mode));
    }
    if b.is_dir != a.is_dir {
        diffs.push(format!("is_dir: {} => {}", b.is_dir, a.is_dir));
    }
    let mtime = timestamp_diff(b.modified, a.modified);
    if !mtime.is_empty() {
        diffs.push(format!("mtime: {mtime}"));
    }
    diffs
}

/// Only uid, gid, and ctime are compared. Mode, size, and mtime are covered
/// by [`info_diffs`]; the remaining fields change without semantic meaning.
pub fn stat_diffs(before: Option<&FileStat>, after: Option<&FileStat>) -> Vec<String> {
    let (b, a) = match (before, after) {
        (None, None) => return Vec::new(),
        (Some(_), None) => return vec!["stat: present => missing".to_string()],
        (None, Some(_)) => return vec!["stat: missing => present".to_string()],
        (Some(b), Some(a)) => (b, a),
    };
    let mut diffs = Vec::new();
    if b.uid != a.uid {
        diffs.push(format!("uid: {} => {}", b.uid, a.uid));
    }
    if b.gid != a.gid {
        diffs.push(format!("gid: {} => {}", b.gid, a.gid));
    }
    diffs.extend(ctime_diff(b, a));
    diffs
}

/// A ctime change is reported only when it differs from the mtime change.
/// Writing content moves both stamps together, so that case is covered by the
/// mtime line already.
pub fn ctime_diff(before: &FileStat, after: &FileStat) -> Option<String> {
    let cdiff = timestamp_diff(before.ctime, after.ctime);
    if cdiff.is_empty() {
        return None;
    }
    let mdiff = timestamp_diff(before.mtime, after.mtime);
    (mdiff != cdiff).then(|| format!("ctime: {cdiff}"))
}

/// All diff lines for one file, sorted and joined with newlines. An empty
/// string means the file is unchanged.
pub fn diff_file(before: &File, after: &File) -> Result<String, FileDiffError> {
    if before.version != after.version {
        return Err(FileDiffError::VersionMismatch {
            before: before.version,
            after: after.version,
        });
    }
    if before.path != after.path {
        return Err(FileDiffError::PathMismatch {
            before: before.path.clone(),
            after: after.path.clone(),
        });
    }
    let mut diffs = fingerprint_diffs(before.fingerprint.as_ref(), after.fingerprint.as_ref());
    diffs.extend(info_diffs(before.info.as_ref(), after.info.as_ref()));
    diffs.extend(stat_diffs(before.stat.as_ref(), after.stat.as_ref()));
    diffs.sort();
    Ok(diffs.join("\n"))
}
