/// Review records: the pinned "last known good" walk per host.
///
/// A review is only ever created or replaced after an operator confirms a
/// report. The scanner never touches these.
use super::file::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The pinned baseline for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Review {
    /// ID of the walk considered last known good.
    pub walk_id: String,
    /// Where that walk's serialised bytes live.
    pub walk_reference: String,
    /// Fingerprint of those exact bytes.
    pub fingerprint: Fingerprint,
}

/// The whole review store, keyed by hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Reviews {
    pub reviews: BTreeMap<String, Review>,
}
