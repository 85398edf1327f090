//! Read-only views over a registry: capability metadata, module index and
//! per-module guardrail health

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::federation::HealthCommand;
use crate::manifest::{Capability, CapabilityMetadata, Guardrails};
use crate::registry::ModuleRegistry;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityMeta {
    pub id: String,
    pub summary: String,
    pub module: String,
    pub module_summary: String,
    pub entrypoint: String,
    pub manifest: String,
    pub metadata: CapabilityMetadata,
    pub guardrails: Guardrails,
    pub inputs: Option<Value>,
    pub outputs: Option<Value>,
    pub agent: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleIndexEntry {
    pub id: String,
    pub summary: String,
    pub manifest: String,
    pub capability_total: usize,
    pub capability_enabled: usize,
    pub module_root: String,
    pub tags: Vec<String>,
}

/// Guardrails aggregated over a module's enabled capabilities
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailSummary {
    /// `[min, max]` of `maxRuntimeSeconds`, `[0, 0]` when empty
    pub runtime_range: [u64; 2],
    pub allowed_env: Vec<String>,
    pub allowed_entry_roots: Vec<String>,
    pub allowed_exit_codes: Vec<i32>,
    pub allow_network: bool,
}

impl GuardrailSummary {
    pub fn from_capabilities<'a>(capabilities: impl IntoIterator<Item = &'a Capability>) -> Self {
        let guardrails: Vec<&Guardrails> = capabilities.into_iter().map(|c| &c.guardrails).collect();
        let runtimes = guardrails.iter().map(|g| g.max_runtime_seconds);
        let (Some(min), Some(max)) = (runtimes.clone().min(), runtimes.max()) else {
            return Self::default();
        };

        let env: BTreeSet<&String> = guardrails.iter().flat_map(|g| &g.allowed_env).collect();
        let roots: BTreeSet<&String> = guardrails
            .iter()
            .flat_map(|g| &g.allowed_entrypoint_roots)
            .collect();
        let codes: BTreeSet<i32> = guardrails
            .iter()
            .flat_map(|g| g.allowed_exit_codes.iter().copied())
            .collect();

        Self {
            runtime_range: [min, max],
            allowed_env: env.into_iter().cloned().collect(),
            allowed_entry_roots: roots.into_iter().cloned().collect(),
            allowed_exit_codes: codes.into_iter().collect(),
            allow_network: guardrails.iter().any(|g| g.allow_network),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleHealthSnapshot {
    pub id: String,
    pub summary: String,
    pub manifest: String,
    /// `ready` with at least one enabled capability, else `empty`
    pub status: String,
    pub capability_enabled: usize,
    pub guardrails: GuardrailSummary,
    pub health_commands: Vec<HealthCommand>,
}

impl ModuleRegistry {
    /// Ids of every enabled capability.
    pub fn capability_ids(&self) -> Vec<String> {
        self.enabled_capabilities()
            .map(|(_, capability)| capability.id.clone())
            .collect()
    }

    pub fn capability_meta(&self) -> Vec<CapabilityMeta> {
        self.enabled_capabilities()
            .map(|(runtime, capability)| CapabilityMeta {
                id: capability.id.clone(),
                summary: capability.summary.clone(),
                module: runtime.id.clone(),
                module_summary: runtime.summary.clone(),
                entrypoint: capability.entrypoint.clone(),
                manifest: self.relative(&runtime.manifest_path),
                metadata: capability.metadata.clone(),
                guardrails: capability.guardrails.clone(),
                inputs: capability.inputs.clone(),
                outputs: capability.outputs.clone(),
                agent: capability.agent.clone(),
            })
            .collect()
    }

    pub fn module_index(&self) -> Vec<ModuleIndexEntry> {
        self.modules()
            .iter()
            .map(|runtime| ModuleIndexEntry {
                id: runtime.id.clone(),
                summary: runtime.summary.clone(),
                manifest: self.relative(&runtime.manifest_path),
                capability_total: runtime.manifest.capabilities.len(),
                capability_enabled: runtime.manifest.enabled_capabilities().count(),
                module_root: runtime.workdir.to_string_lossy().into_owned(),
                tags: runtime
                    .module_meta
                    .as_ref()
                    .map(|meta| meta.tags.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub fn health_snapshot(&self) -> Vec<ModuleHealthSnapshot> {
        self.modules()
            .iter()
            .map(|runtime| {
                let enabled: Vec<&Capability> = runtime.manifest.enabled_capabilities().collect();
                ModuleHealthSnapshot {
                    id: runtime.id.clone(),
                    summary: runtime.summary.clone(),
                    manifest: self.relative(&runtime.manifest_path),
                    status: if enabled.is_empty() { "empty" } else { "ready" }.to_string(),
                    capability_enabled: enabled.len(),
                    guardrails: GuardrailSummary::from_capabilities(enabled.iter().copied()),
                    health_commands: runtime
                        .module_meta
                        .as_ref()
                        .map(|meta| meta.health.commands.clone())
                        .unwrap_or_default(),
                }
            })
            .collect()
    }
}
