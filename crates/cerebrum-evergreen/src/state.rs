//! Persisted evergreen state and run records

use std::collections::BTreeMap;

use cerebrum_fs::{NormalizedPath, Result, json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Watch key -> `sha256:<hex>` digest, `None` when the target is missing
pub type Hashes = BTreeMap<String, Option<String>>;

/// The hash/run state document.
///
/// Rewritten wholesale on every update. Keys this crate does not know about
/// are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvergreenState {
    /// Digests recorded by the last successful run
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hashes: Hashes,
    /// Most recent run, successful or not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunSummary>,
    /// Most recent python alignment probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_probe: Option<ProbeSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EvergreenState {
    /// Load state, treating a missing or corrupt file as empty.
    pub fn load(path: &NormalizedPath) -> Self {
        json::load_or_default(path)
    }

    /// Write the whole document atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        json::save_pretty(path, self)
    }
}

/// Outcome of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// One validation run, written next to its log as `<run_id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    /// UTC `%Y%m%dT%H%M%SZ`
    pub timestamp: String,
    pub command: String,
    pub templates: Vec<String>,
    pub force_rebuild: bool,
    pub duration_seconds: f64,
    pub exit_code: i32,
    pub hashes: Hashes,
    pub changed_targets: Vec<String>,
    pub log_path: String,
    pub artifact_path: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_probe: Option<ProbeSummary>,
}

/// Outcome of the python alignment probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Success,
    Failed,
    Skipped,
}

/// One external command run by the probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStep {
    pub step: String,
    pub code: i32,
}

/// Recorded probe result, cached per canonical/override version pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSummary {
    pub status: ProbeStatus,
    pub message: String,
    pub log_path: String,
    #[serde(default)]
    pub steps: Vec<ProbeStep>,
    /// RFC 3339, UTC with a `Z` suffix
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub canonical: String,
    #[serde(default, rename = "override")]
    pub override_version: String,
    #[serde(default)]
    pub allow_lower: bool,
}
