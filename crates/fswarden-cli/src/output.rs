/// Terminal rendering of reports and metrics.
///
/// Every function returns the text instead of printing it so commands decide
/// where it goes and tests can inspect it.
use fswarden_core::report::diff::TIME_REPORT_FORMAT;
use fswarden_core::report::COUNT_BEFORE_FILES;
use fswarden_core::{Counter, Notification, Report, ReportConfig, Walk};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;

const RULE: &str =
    "===============================================================================";

fn section(title: &str) -> Vec<String> {
    vec![RULE.to_string(), format!("{title}:"), RULE.to_string()]
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn walk_summary(walk: &Walk) -> Vec<String> {
    vec![
        format!("  - ID: {}", walk.id),
        format!("  - Start Time: {}", walk.start_walk.format(TIME_REPORT_FORMAT)),
        format!("  - Stop Time: {}", walk.stop_walk.format(TIME_REPORT_FORMAT)),
    ]
}

/// Host, report config, and the ids and times of both walks.
pub fn render_report_summary(report: &Report<'_>, config_path: &Path) -> String {
    let mut lines = section("Report Summary");
    lines.push(format!("Host name: {}", report.walk_after.hostname));
    lines.push(format!("Report config used: {}", config_path.display()));
    if let Some(before) = report.walk_before {
        lines.push("Walk (Before)".to_string());
        lines.extend(walk_summary(before));
    }
    lines.push("Walk (After)".to_string());
    lines.extend(walk_summary(report.walk_after));
    lines.push(String::new());
    finish(lines)
}

fn to_toml<T: Serialize>(value: &T) -> String {
    toml::to_string(value).unwrap_or_else(|e| format!("error encoding TOML: {e}"))
}

/// Whether the two walks ran under the same policy. Verbose output adds the
/// policy and the report config as TOML.
pub fn render_rule_summary(report: &Report<'_>, config: &ReportConfig, verbose: bool) -> String {
    let mut lines = section("Rule Summary");

    if let Some(before) = report.walk_before {
        if before.policy == report.walk_after.policy {
            lines.push("No changes.".to_string());
        } else {
            lines.push("Walks policy diff:".to_string());
            lines.push("Before:".to_string());
            lines.push(to_toml(&before.policy));
            lines.push("After:".to_string());
            lines.push(to_toml(&report.walk_after.policy));
        }
    }
    if verbose {
        let policy = report
            .walk_before
            .map_or(&report.walk_after.policy, |w| &w.policy);
        lines.push("Client Policy:".to_string());
        lines.push(to_toml(policy));
        lines.push("Report Config:".to_string());
        lines.push(to_toml(config));
    }
    finish(lines)
}

fn notification_lines(label: &str, notifications: &[Notification], verbose: bool) -> Vec<String> {
    if notifications.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Walking Errors for {label} file:")];
    lines.extend(
        notifications
            .iter()
            .filter(|n| verbose || n.severity.is_actionable())
            .map(|n| format!("{}({}): {}", n.severity, n.path, n.message)),
    );
    lines.push(String::new());
    lines
}

/// Added, removed, modified, and failed paths plus walk notifications.
/// INFO and UNKNOWN notifications only show up when `verbose`.
pub fn render_diff_summary(report: &Report<'_>, verbose: bool) -> String {
    let mut lines = section("Object Summary");

    if !report.added.is_empty() {
        lines.push(format!("Added ({}):", report.added.len()));
        lines.extend(report.added.iter().map(|a| a.path().to_string()));
        lines.push(String::new());
    }
    if !report.deleted.is_empty() {
        lines.push(format!("Removed ({}):", report.deleted.len()));
        lines.extend(report.deleted.iter().map(|a| a.path().to_string()));
        lines.push(String::new());
    }
    if !report.modified.is_empty() {
        lines.push(format!("Modified ({}):", report.modified.len()));
        for action in &report.modified {
            lines.push(action.path().to_string());
            if verbose {
                lines.push(action.diff.clone());
                lines.push(String::new());
            }
        }
        lines.push(String::new());
    }
    if !report.errors.is_empty() {
        lines.push(format!("Reporting Errors ({}):", report.errors.len()));
        for action in &report.errors {
            let reason = action
                .error
                .as_ref()
                .map_or_else(String::new, |e| e.to_string());
            lines.push(format!("{}: {reason}", action.path()));
        }
        lines.push(String::new());
    }
    if report.is_empty() {
        lines.push("No changes.".to_string());
    }
    if let Some(before) = report.walk_before {
        lines.extend(notification_lines("BEFORE", &before.notifications, verbose));
    }
    lines.extend(notification_lines(
        "AFTER",
        &report.walk_after.notifications,
        verbose,
    ));
    finish(lines)
}

/// Report metric order: `before-files*` first, then by name.
pub fn sort_report_metrics(names: &mut [String]) {
    names.sort_by(|a, b| {
        match (
            a.starts_with(COUNT_BEFORE_FILES),
            b.starts_with(COUNT_BEFORE_FILES),
        ) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.cmp(b),
        }
    });
}

/// One `[name] = value` line per counter, in the order of `names`.
pub fn render_metrics(counter: &Counter, names: &[String]) -> String {
    names
        .iter()
        .map(|name| {
            format!(
                "[{name:<30}] = {:>6}\n",
                counter.get(name).unwrap_or_default()
            )
        })
        .collect()
}
