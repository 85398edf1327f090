//! Module resolution and the capability registry

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use cerebrum_fs::{NormalizedPath, path::resolve_against};

use crate::federation::{FederatedModule, FederationManifest};
use crate::manifest::{Capability, CapabilityManifest};
use crate::{Error, Result};

/// Tool name exposed for a capability id.
pub fn tool_name(capability_id: &str) -> String {
    capability_id.replace('.', "_")
}

/// How modules are selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryConfig {
    /// Modules listed in a federation manifest, optionally filtered by id
    Federation {
        path: PathBuf,
        filter: Option<BTreeSet<String>>,
    },
    /// One manifest loaded directly
    Single {
        manifest: PathBuf,
        module_id: Option<String>,
    },
}

/// A loaded module, immutable for the process lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRuntime {
    pub id: String,
    pub summary: String,
    pub manifest_path: PathBuf,
    pub manifest_dir: PathBuf,
    pub workdir: PathBuf,
    pub manifest: CapabilityManifest,
    pub module_meta: Option<FederatedModule>,
}

impl ModuleRuntime {
    fn from_module(module: &FederatedModule, root: &Path) -> Result<Self> {
        let manifest_path = module.manifest_path(root);
        let workdir = module.repo_path(root);
        let manifest = CapabilityManifest::load(&manifest_path, &workdir)?;
        Ok(Self {
            id: module.id.clone(),
            summary: module.summary.clone(),
            manifest_dir: parent_or(&manifest_path, &workdir),
            manifest_path,
            workdir,
            manifest,
            module_meta: Some(module.clone()),
        })
    }

    fn from_manifest(manifest_path: PathBuf, root: &Path, module_id: Option<String>) -> Result<Self> {
        let manifest = CapabilityManifest::load(&manifest_path, root)?;
        let file_name = manifest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = module_id.unwrap_or_else(|| {
            manifest_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        Ok(Self {
            id,
            summary: format!("Standalone manifest {file_name}"),
            manifest_dir: parent_or(&manifest_path, root),
            manifest_path,
            workdir: root.to_path_buf(),
            manifest,
            module_meta: None,
        })
    }
}

fn parent_or(path: &Path, fallback: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf())
}

/// Every loaded module, with capability ids and tool names guaranteed
/// unique across modules
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    root: PathBuf,
    modules: Vec<ModuleRuntime>,
    federation: Option<FederationManifest>,
}

impl ModuleRegistry {
    /// Validate and assemble a registry.
    ///
    /// Fails when there are no modules or when two enabled capabilities
    /// share an id or a tool name.
    pub fn new(
        root: impl Into<PathBuf>,
        modules: Vec<ModuleRuntime>,
        federation: Option<FederationManifest>,
    ) -> Result<Self> {
        if modules.is_empty() {
            return Err(Error::NoModules);
        }

        let mut ids: BTreeMap<&str, &str> = BTreeMap::new();
        let mut tools: BTreeMap<String, &str> = BTreeMap::new();
        for runtime in &modules {
            for capability in runtime.manifest.enabled_capabilities() {
                if let Some(first) = ids.insert(&capability.id, &runtime.id) {
                    return Err(Error::DuplicateCapability {
                        id: capability.id.clone(),
                        first: first.to_string(),
                        second: runtime.id.clone(),
                    });
                }
                if let Some(first) = tools.insert(tool_name(&capability.id), &capability.id) {
                    return Err(Error::DuplicateToolName {
                        name: tool_name(&capability.id),
                        first: first.to_string(),
                        second: capability.id.clone(),
                    });
                }
            }
        }

        Ok(Self {
            root: root.into(),
            modules,
            federation,
        })
    }

    /// Resolve modules from `config`, with relative paths taken against
    /// `root`.
    pub fn from_config(config: &RegistryConfig, root: &Path) -> Result<Self> {
        let root = &resolve_against(root, Path::new("."));
        match config {
            RegistryConfig::Single {
                manifest,
                module_id,
            } => {
                let manifest_path = resolve_against(root, manifest);
                let runtime = ModuleRuntime::from_manifest(manifest_path, root, module_id.clone())?;
                Self::new(root, vec![runtime], None)
            }
            RegistryConfig::Federation { path, filter } => {
                let federation = FederationManifest::load(&resolve_against(root, path))?;
                let filter = filter.as_ref().filter(|ids| !ids.is_empty());

                if let Some(ids) = filter {
                    let missing: Vec<&str> = ids
                        .iter()
                        .filter(|id| federation.module(id).is_none())
                        .map(String::as_str)
                        .collect();
                    if !missing.is_empty() {
                        return Err(Error::UnknownModules {
                            ids: missing.join(", "),
                        });
                    }
                }

                let modules = federation
                    .modules
                    .iter()
                    .filter(|module| match filter {
                        Some(ids) => ids.contains(&module.id),
                        None => module.include_in_root,
                    })
                    .map(|module| ModuleRuntime::from_module(module, root))
                    .collect::<Result<Vec<_>>>()?;

                tracing::info!(
                    modules = modules.len(),
                    federation = %path.display(),
                    "Resolved federated modules"
                );
                Self::new(root, modules, Some(federation))
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn modules(&self) -> &[ModuleRuntime] {
        &self.modules
    }

    pub fn federation(&self) -> Option<&FederationManifest> {
        self.federation.as_ref()
    }

    /// Enabled capabilities paired with their module, in load order.
    pub fn enabled_capabilities(&self) -> impl Iterator<Item = (&ModuleRuntime, &Capability)> {
        self.modules.iter().flat_map(|runtime| {
            runtime
                .manifest
                .enabled_capabilities()
                .map(move |capability| (runtime, capability))
        })
    }

    /// Look up an enabled capability by id.
    pub fn capability(&self, id: &str) -> Option<(&ModuleRuntime, &Capability)> {
        self.enabled_capabilities().find(|(_, capability)| capability.id == id)
    }

    /// Look up an enabled capability by its tool name.
    pub fn capability_by_tool(&self, name: &str) -> Option<(&ModuleRuntime, &Capability)> {
        self.enabled_capabilities()
            .find(|(_, capability)| tool_name(&capability.id) == name)
    }

    /// Workspace-relative form of `path`, unchanged when outside the root.
    pub fn relative(&self, path: &Path) -> String {
        NormalizedPath::new(path).relative_to(&self.root)
    }
}
