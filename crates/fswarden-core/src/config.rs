/// TOML decoding of walk policies and report configs.
///
/// Both documents reject unknown keys. A policy must name at least one
/// include root. Overlapping roots are allowed but logged; the scanner skips
/// whatever it reaches a second time.
use crate::error::ConfigError;
use crate::model::{Policy, ReportConfig};
use crate::path::clean_path;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, MAIN_SEPARATOR};
use tracing::{debug, warn};

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a walk policy.
pub fn load_policy(path: &Path) -> Result<Policy, ConfigError> {
    let policy: Policy = read_toml(path)?;
    if policy.include.is_empty() {
        return Err(ConfigError::NoIncludes {
            path: path.to_path_buf(),
        });
    }
    for (outer, inner) in nested_includes(&policy.include) {
        warn!("include path {inner} is nested under {outer}; repeated entries will be skipped");
    }
    debug!(
        "Loaded policy {}: {} include, {} exclude",
        path.display(),
        policy.include.len(),
        policy.exclude.len()
    );
    Ok(policy)
}

/// Load a report config.
pub fn load_report_config(path: &Path) -> Result<ReportConfig, ConfigError> {
    let config: ReportConfig = read_toml(path)?;
    debug!(
        "Loaded report config {}: {} exclude",
        path.display(),
        config.exclude.len()
    );
    Ok(config)
}

/// Pairs `(outer, inner)` where `inner` lies below `outer`.
fn nested_includes(include: &[String]) -> Vec<(&str, &str)> {
    let cleaned: Vec<String> = include.iter().map(|p| clean_path(p)).collect();
    let mut out = Vec::new();
    for (i, outer) in cleaned.iter().enumerate() {
        let mut prefix = outer.clone();
        if !prefix.ends_with(MAIN_SEPARATOR) {
            prefix.push(MAIN_SEPARATOR);
        }
        for (j, inner) in cleaned.iter().enumerate() {
            if i != j && inner.starts_with(&prefix) {
                out.push((include[i].as_str(), include[j].as_str()));
            }
        }
    }
    out
}
