//! Federation manifest: the list of participating modules

use std::path::{Path, PathBuf};

use cerebrum_fs::{ConfigStore, NormalizedPath, path::resolve_against};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FederationManifest {
    #[serde(default)]
    pub modules: Vec<FederatedModule>,
}

impl FederationManifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FederationMissing {
                path: path.to_path_buf(),
            });
        }
        Ok(ConfigStore::new().load(&NormalizedPath::new(path))?)
    }

    pub fn module(&self, id: &str) -> Option<&FederatedModule> {
        self.modules.iter().find(|module| module.id == id)
    }
}

fn current_dir() -> String {
    ".".to_string()
}

fn included() -> bool {
    true
}

/// One module of the federation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedModule {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    /// Module root relative to the workspace
    #[serde(default = "current_dir")]
    pub path: String,
    /// Capability manifest relative to the module root
    pub manifest: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub health: ModuleHealthConfig,
    /// Part of the default (unfiltered) module set
    #[serde(default = "included", alias = "include_in_root")]
    pub include_in_root: bool,
}

impl FederatedModule {
    pub fn repo_path(&self, root: &Path) -> PathBuf {
        resolve_against(root, Path::new(&self.path))
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        resolve_against(&self.repo_path(root), Path::new(&self.manifest))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleHealthConfig {
    #[serde(default)]
    pub commands: Vec<HealthCommand>,
}

/// A health-check command advertised by a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCommand {
    pub name: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cerebrum_test_utils::workspace::TestWorkspace;
    use serde_json::json;

    #[test]
    fn module_defaults() {
        let module: FederatedModule =
            serde_json::from_value(json!({"id": "n00t", "manifest": "capabilities/manifest.json"}))
                .unwrap();
        assert_eq!(module.path, ".");
        assert!(module.include_in_root);
        assert!(module.health.commands.is_empty());
    }

    #[test]
    fn paths_resolve_under_module_root() {
        let ws = TestWorkspace::new();
        ws.write_json("n00t/capabilities/manifest.json", &json!({"capabilities": []}));
        let module: FederatedModule = serde_json::from_value(json!({
            "id": "n00t",
            "path": "n00t",
            "manifest": "capabilities/manifest.json",
            "includeInRoot": false,
        }))
        .unwrap();
        assert!(!module.include_in_root);
        assert!(module.repo_path(ws.root()).ends_with("n00t"));
        assert!(module.manifest_path(ws.root()).is_file());
    }

    #[test]
    fn missing_federation_manifest_is_fatal() {
        let ws = TestWorkspace::new();
        let err = FederationManifest::load(&ws.path("mcp/federation_manifest.json")).unwrap_err();
        assert!(matches!(err, Error::FederationMissing { .. }));
    }
}
