//! Workspace configuration
//!
//! Loaded from the optional `.cerebrum/config.toml` at the workspace root.
//! Every field has a default so an empty or missing file yields a usable
//! configuration; relative paths are resolved against the workspace root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cerebrum_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

/// Location of the configuration file relative to the workspace root
pub const CONFIG_PATH: &str = ".cerebrum/config.toml";

/// Top-level workspace configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Change-driven validator settings
    pub evergreen: EvergreenConfig,
    /// Capability dispatcher settings
    pub capabilities: CapabilitiesConfig,
    /// Agent scaffold settings
    pub agents: AgentsConfig,
}

impl WorkspaceConfig {
    /// Load the configuration for `root`.
    ///
    /// A missing file yields defaults. An unparseable file is logged and
    /// also yields defaults.
    pub fn load(root: &Path) -> Self {
        let path = NormalizedPath::new(root.join(CONFIG_PATH));
        if !path.exists() {
            tracing::debug!(path = %path, "No workspace config, using defaults");
            return Self::default();
        }
        match ConfigStore::new().load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Ignoring unreadable workspace config");
                Self::default()
            }
        }
    }
}

/// Resolve a configured path against the workspace root.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Settings for the change-driven validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvergreenConfig {
    /// Project the validation command runs in
    pub project_dir: PathBuf,
    /// Validation program followed by its fixed arguments
    pub validate_command: Vec<String>,
    /// Directory receiving per-run log and JSON summary files
    pub artifact_dir: PathBuf,
    /// Persisted hash/run state document
    pub state_file: PathBuf,
    /// Prefix of every run identifier
    pub run_prefix: String,
    /// Watch key -> file whose digest triggers re-validation
    pub watch: BTreeMap<String, PathBuf>,
    /// Python alignment probe
    pub probe: ProbeConfig,
}

impl Default for EvergreenConfig {
    fn default() -> Self {
        let mut watch = BTreeMap::new();
        watch.insert(
            "toolchainManifest".to_string(),
            PathBuf::from("cortex/data/toolchain-manifest.json"),
        );
        watch.insert(
            "frontiersCatalog".to_string(),
            PathBuf::from("frontiers/catalog.json"),
        );
        Self {
            project_dir: PathBuf::from("frontiers"),
            validate_command: vec![".dev/validate-templates.sh".into(), "--all".into()],
            artifact_dir: PathBuf::from(".dev/automation/artifacts/automation"),
            state_file: PathBuf::from(
                ".dev/automation/artifacts/automation/frontiers-evergreen-state.json",
            ),
            run_prefix: "frontiers-evergreen".to_string(),
            watch,
            probe: ProbeConfig::default(),
        }
    }
}

/// Settings for the python alignment probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Toolchain manifest holding `toolchains.python.version`
    pub toolchain_manifest: PathBuf,
    /// Per-project override file holding `overrides.python`
    pub override_file: PathBuf,
    /// Requirements file, relative to the project directory
    pub requirements: PathBuf,
    /// Interpreter/environment installer executable
    pub installer: String,
    /// Ephemeral environment directory, relative to the project directory
    pub venv_dir: PathBuf,
    /// Probe log file
    pub log_file: PathBuf,
    /// Age after which a cached probe for the same version pair is re-run
    pub retention_hours: i64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            toolchain_manifest: PathBuf::from("cortex/data/toolchain-manifest.json"),
            override_file: PathBuf::from("cortex/data/dependency-overrides/frontiers.json"),
            requirements: PathBuf::from("requirements.txt"),
            installer: "uv".to_string(),
            venv_dir: PathBuf::from(".dev/.python-probe-venv"),
            log_file: PathBuf::from(".dev/automation/artifacts/automation/frontiers-python-probe.log"),
            retention_hours: 24,
        }
    }
}

/// Settings for the capability dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitiesConfig {
    /// Federation manifest listing capability modules
    pub federation_manifest: PathBuf,
    /// Manifest used in single mode when none is given
    pub default_manifest: PathBuf,
    /// Interpreter for `.py` entrypoints
    pub python: String,
    /// Shell for `.sh` entrypoints and non-executable files
    pub shell: String,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            federation_manifest: PathBuf::from("mcp/federation_manifest.json"),
            default_manifest: PathBuf::from("capabilities/manifest.json"),
            python: "python3".to_string(),
            shell: "bash".to_string(),
        }
    }
}

/// Settings for the agent scaffold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Root directory for generated agent documents
    pub docs_root: PathBuf,
    /// JSON registry keyed by agent id
    pub registry: PathBuf,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            docs_root: PathBuf::from("agents/docs"),
            registry: PathBuf::from("agents/docs/agent-registry.json"),
        }
    }
}
