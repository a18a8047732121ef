/// Path normalisation and prefix exclusion.
///
/// Shared by the scanner and the reporter. Paths are handled as `String`s
/// because that is how they are persisted; cleaning is purely lexical and
/// never touches the filesystem.
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Lexically clean a path: collapse repeated separators, drop `.` segments,
/// resolve `..` against preceding segments, and strip any trailing separator
/// (except for the root itself). An empty path cleans to `"."`.
pub fn clean_path(path: &str) -> String {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return ".".to_string();
    }
    out.iter()
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

/// Clean `path` and append a trailing separator iff `is_dir`.
///
/// Must be applied before comparing two paths, since raw paths may differ
/// only in the presence of a trailing separator.
pub fn normalize_path(path: &str, is_dir: bool) -> String {
    let mut p = clean_path(path);
    if is_dir && !p.ends_with(MAIN_SEPARATOR) {
        p.push(MAIN_SEPARATOR);
    }
    p
}

/// The directory holding `path`, cleaned, with a trailing separator.
///
/// For a normalised directory path (`/tmp/foo/`) this is the directory
/// itself, mirroring how the last separator splits the path.
fn parent_with_separator(path: &str) -> String {
    let dir = match path.rfind(MAIN_SEPARATOR) {
        Some(i) => &path[..=i],
        None => ".",
    };
    let mut d = clean_path(dir);
    if !d.ends_with(MAIN_SEPARATOR) {
        d.push(MAIN_SEPARATOR);
    }
    d
}

/// Whether `path` is excluded by any of the given prefixes.
///
/// A prefix matches if it equals `path` exactly, or if it ends in a separator
/// and the directory portion of `path` starts with it. A prefix without a
/// trailing separator therefore matches one exact path only: excluding
/// `/tmp/some_file` leaves both `/tmp/some_file2` and the directory
/// `/tmp/some_file/` alone.
pub fn is_excluded<S: AsRef<str>>(path: &str, excluded: &[S]) -> bool {
    let mut dir: Option<String> = None;
    excluded.iter().map(AsRef::as_ref).any(|prefix| {
        if prefix.is_empty() {
            return false;
        }
        if path == prefix {
            return true;
        }
        if !prefix.ends_with(MAIN_SEPARATOR) {
            return false;
        }
        dir.get_or_insert_with(|| parent_with_separator(path))
            .starts_with(prefix)
    })
}

/// Number of path segments `path` lies below `root`.
///
/// The root itself is depth 0 and its direct children are depth 1. A path
/// outside `root` reports depth 0.
pub fn rel_depth(root: &str, path: &str) -> usize {
    let root = clean_path(root);
    let path = clean_path(path);
    Path::new(&path)
        .strip_prefix(&root)
        .map(|rest| {
            rest.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0)
}
