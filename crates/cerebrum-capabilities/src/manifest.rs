//! Capability manifests

use std::path::{Path, PathBuf};

use cerebrum_fs::{ConfigStore, NormalizedPath, path::resolve_against};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::ArgumentSchema;
use crate::{Error, Result};

/// A module's list of capabilities
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapabilityManifest {
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl CapabilityManifest {
    /// Load a manifest (JSON, YAML or TOML by extension).
    ///
    /// Entrypoints of enabled capabilities that declare
    /// `allowedEntrypointRoots` must resolve inside one of those roots,
    /// taken relative to `workdir`.
    pub fn load(path: &Path, workdir: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestMissing {
                path: path.to_path_buf(),
            });
        }
        let manifest: Self = ConfigStore::new().load(&NormalizedPath::new(path))?;
        let manifest_dir = path.parent().unwrap_or(workdir);
        for capability in manifest.enabled_capabilities() {
            capability.check_entrypoint_roots(workdir, manifest_dir)?;
        }
        tracing::debug!(
            path = %path.display(),
            capabilities = manifest.capabilities.len(),
            "Loaded capability manifest"
        );
        Ok(manifest)
    }

    /// Capabilities not opted out of tool exposure.
    pub fn enabled_capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().filter(|c| c.is_mcp_enabled())
    }
}

/// A declared, guarded operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub entrypoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(default)]
    pub guardrails: Guardrails,
    #[serde(default)]
    pub metadata: CapabilityMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Value>,
}

impl Capability {
    pub fn is_mcp_enabled(&self) -> bool {
        self.metadata.mcp_enabled
    }

    /// Argument validator for this capability's inputs.
    pub fn argument_schema(&self) -> ArgumentSchema {
        ArgumentSchema::from_json(self.inputs.as_ref())
    }

    /// Absolute entrypoint path.
    ///
    /// Relative entrypoints are tried under `workdir` first, then under the
    /// manifest's directory; when neither exists the `workdir` form is used.
    pub fn resolved_entrypoint(&self, workdir: &Path, manifest_dir: &Path) -> PathBuf {
        let entrypoint = Path::new(&self.entrypoint);
        if entrypoint.is_absolute() {
            return entrypoint.to_path_buf();
        }
        let under_workdir = resolve_against(workdir, entrypoint);
        if under_workdir.exists() {
            return under_workdir;
        }
        let under_manifest = resolve_against(manifest_dir, entrypoint);
        if under_manifest.exists() {
            under_manifest
        } else {
            under_workdir
        }
    }

    fn check_entrypoint_roots(&self, workdir: &Path, manifest_dir: &Path) -> Result<()> {
        let roots = &self.guardrails.allowed_entrypoint_roots;
        if roots.is_empty() {
            return Ok(());
        }
        let entrypoint = self.resolved_entrypoint(workdir, manifest_dir);
        let inside = roots
            .iter()
            .map(|root| resolve_against(workdir, Path::new(root)))
            .any(|root| entrypoint.starts_with(&root));
        if inside {
            Ok(())
        } else {
            Err(Error::EntrypointOutsideRoots {
                capability: self.id.clone(),
                entrypoint,
            })
        }
    }
}

fn default_exit_codes() -> Vec<i32> {
    vec![0]
}

fn default_max_runtime() -> u64 {
    300
}

/// Execution policy of a capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardrails {
    /// Environment variables forwarded from the server's environment
    #[serde(default, alias = "allowed_env")]
    pub allowed_env: Vec<String>,
    /// Directories the entrypoint must live under, relative to the workdir
    #[serde(default, alias = "allowed_entrypoint_roots")]
    pub allowed_entrypoint_roots: Vec<String>,
    #[serde(default = "default_exit_codes", alias = "allowed_exit_codes")]
    pub allowed_exit_codes: Vec<i32>,
    #[serde(default = "default_max_runtime", alias = "max_runtime_seconds")]
    pub max_runtime_seconds: u64,
    /// Reported only; network access is not restricted
    #[serde(default, alias = "allow_network")]
    pub allow_network: bool,
}

impl Default for Guardrails {
    fn default() -> Self {
        Self {
            allowed_env: Vec::new(),
            allowed_entrypoint_roots: Vec::new(),
            allowed_exit_codes: default_exit_codes(),
            max_runtime_seconds: default_max_runtime(),
            allow_network: false,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Free-form capability metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityMetadata {
    #[serde(default = "enabled", alias = "mcp_enabled")]
    pub mcp_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CapabilityMetadata {
    fn default() -> Self {
        Self {
            mcp_enabled: true,
            owner: None,
            tags: Vec::new(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cerebrum_test_utils::workspace::TestWorkspace;
    use serde_json::json;

    #[test]
    fn defaults_apply() {
        let capability: Capability =
            serde_json::from_value(json!({"id": "a.b", "entrypoint": "run.sh"})).unwrap();
        assert!(capability.is_mcp_enabled());
        assert_eq!(capability.guardrails.allowed_exit_codes, vec![0]);
        assert_eq!(capability.guardrails.max_runtime_seconds, 300);
        assert!(!capability.guardrails.allow_network);
    }

    #[test]
    fn snake_case_guardrails_accepted() {
        let guardrails: Guardrails = serde_json::from_value(json!({
            "allowed_env": ["HOME"],
            "allowed_exit_codes": [0, 2],
            "max_runtime_seconds": 5,
        }))
        .unwrap();
        assert_eq!(guardrails.allowed_env, vec!["HOME".to_string()]);
        assert_eq!(guardrails.allowed_exit_codes, vec![0, 2]);
        assert_eq!(guardrails.max_runtime_seconds, 5);
    }

    #[test]
    fn metadata_keeps_unknown_keys() {
        let metadata: CapabilityMetadata =
            serde_json::from_value(json!({"mcpEnabled": false, "stability": "beta"})).unwrap();
        assert!(!metadata.mcp_enabled);
        assert_eq!(metadata.extra["stability"], "beta");
    }

    #[test]
    fn entrypoint_prefers_workdir_then_manifest_dir() {
        let ws = TestWorkspace::new();
        ws.write_script("mod/caps/local.sh", "true");
        ws.write_script("mod/shared.sh", "true");
        let capability = |entrypoint: &str| Capability {
            id: "x".into(),
            summary: String::new(),
            entrypoint: entrypoint.into(),
            inputs: None,
            outputs: None,
            guardrails: Guardrails::default(),
            metadata: CapabilityMetadata::default(),
            agent: None,
        };
        let workdir = ws.path("mod");
        let manifest_dir = ws.path("mod/caps");

        let shared = capability("shared.sh").resolved_entrypoint(&workdir, &manifest_dir);
        assert!(shared.ends_with("mod/shared.sh"));
        let local = capability("local.sh").resolved_entrypoint(&workdir, &manifest_dir);
        assert!(local.ends_with("mod/caps/local.sh"));
        let absent = capability("absent.sh").resolved_entrypoint(&workdir, &manifest_dir);
        assert!(absent.ends_with("mod/absent.sh"));
    }

    #[test]
    fn entrypoint_outside_allowed_roots_fails_load() {
        let ws = TestWorkspace::new();
        ws.write_script("mod/scripts/ok.sh", "true");
        ws.write_script("mod/other/bad.sh", "true");
        ws.write_json(
            "mod/manifest.json",
            &json!({"capabilities": [
                {"id": "mod.ok", "entrypoint": "scripts/ok.sh", "guardrails": {"allowedEntrypointRoots": ["scripts"]}},
            ]}),
        );
        let manifest =
            CapabilityManifest::load(&ws.path("mod/manifest.json"), &ws.path("mod")).unwrap();
        assert_eq!(manifest.capabilities.len(), 1);

        ws.write_json(
            "mod/manifest.json",
            &json!({"capabilities": [
                {"id": "mod.bad", "entrypoint": "other/bad.sh", "guardrails": {"allowedEntrypointRoots": ["scripts"]}},
            ]}),
        );
        let err = CapabilityManifest::load(&ws.path("mod/manifest.json"), &ws.path("mod"))
            .unwrap_err();
        assert!(matches!(err, Error::EntrypointOutsideRoots { ref capability, .. } if capability == "mod.bad"));
    }

    #[test]
    fn yaml_manifest_loads() {
        let ws = TestWorkspace::new();
        ws.write(
            "caps.yaml",
            "capabilities:\n  - id: docs.build\n    summary: Build docs\n    entrypoint: build.sh\n    metadata:\n      mcp_enabled: false\n",
        );
        let manifest = CapabilityManifest::load(&ws.path("caps.yaml"), ws.root()).unwrap();
        assert_eq!(manifest.capabilities[0].id, "docs.build");
        assert_eq!(manifest.enabled_capabilities().count(), 0);
    }
}
