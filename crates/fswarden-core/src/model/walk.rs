/// The inventory produced by one walk.
///
/// A `Walk` is owned by the scanner while it is being built and handed to the
/// completion callback once every worker has drained. After that it is never
/// mutated again; the reporter only reads it.
use super::file::File;
use super::policy::Policy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format version stamped on every `Walk`. Walks of different versions are
/// never compared.
pub const WALK_VERSION: u32 = 1;

/// Severity of a non-fatal issue met during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    Unknown,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Upper-case label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Warnings and errors are shown in reports even without `--verbose`.
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-fatal issue, attached to the walk that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

/// One complete capture of a file tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walk {
    pub version: u32,
    /// Globally unique per capture (UUID v4).
    pub id: String,
    /// The policy the walk was run with.
    pub policy: Policy,
    pub hostname: String,
    pub start_walk: DateTime<Utc>,
    /// Equal to `start_walk` until the walk is finalised.
    pub stop_walk: DateTime<Utc>,
    pub files: Vec<File>,
    pub notifications: Vec<Notification>,
}

impl Walk {
    /// Start a new, empty walk.
    pub fn new(id: String, hostname: String, policy: Policy, start: DateTime<Utc>) -> Self {
        Self {
            version: WALK_VERSION,
            id,
            policy,
            hostname,
            start_walk: start,
            stop_walk: start,
            files: Vec::new(),
            notifications: Vec::new(),
        }
    }

    /// Append a notification.
    pub fn add_notification(
        &mut self,
        severity: Severity,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.notifications.push(Notification {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }

    /// Look up a file by its exact stored path.
    pub fn file(&self, path: &str) -> Option<&File> {
        self.files.iter().find(|f| f.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_walk_is_empty() {
        let now = Utc::now();
        let walk = Walk::new("id-1".into(), "host".into(), Policy::default(), now);
        assert_eq!(walk.version, WALK_VERSION);
        assert_eq!(walk.start_walk, walk.stop_walk);
        assert!(walk.files.is_empty());
        assert!(walk.notifications.is_empty());
    }

    #[test]
    fn test_severity_actionable() {
        assert!(Severity::Warning.is_actionable());
        assert!(Severity::Error.is_actionable());
        assert!(!Severity::Info.is_actionable());
        assert!(!Severity::Unknown.is_actionable());
    }

    #[test]
    fn test_add_notification() {
        let mut walk = Walk::new("id".into(), "h".into(), Policy::default(), Utc::now());
        walk.add_notification(Severity::Warning, "/tmp/", "skipping");
        assert_eq!(walk.notifications.len(), 1);
        assert_eq!(walk.notifications[0].severity, Severity::Warning);
        assert_eq!(walk.notifications[0].path, "/tmp/");
    }
}
