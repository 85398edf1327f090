//! Agent creation: request validation, documents and registry upsert

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use cerebrum_meta::AgentsConfig;
use cerebrum_meta::config::resolve;
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::profile::{AgentCapability, AgentProfile, CREATED_AT, UPDATED_AT};
use crate::registry::{AgentRegistry, UpsertOutcome};
use crate::scaffold::AgentScaffold;
use crate::{Error, Result};

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Input to [`build_agent_profile`]
#[derive(Debug, Clone, Default)]
pub struct AgentRequest {
    pub agent_id: String,
    /// Display name; defaults to the id
    pub name: Option<String>,
    pub role: String,
    pub description: String,
    pub tags: Vec<String>,
    pub guardrails: Vec<String>,
    pub capabilities: Vec<AgentCapability>,
}

/// Validate a request and turn it into a draft profile.
pub fn build_agent_profile(request: AgentRequest) -> Result<AgentProfile> {
    let agent_id = request.agent_id.trim().to_string();
    if !SLUG.is_match(&agent_id) {
        return Err(Error::InvalidAgentId(agent_id));
    }
    if request.role.trim().is_empty() {
        return Err(Error::EmptyField { field: "role" });
    }
    if request.description.trim().is_empty() {
        return Err(Error::EmptyField { field: "description" });
    }

    let name = request
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| agent_id.clone());
    let mut profile = AgentProfile::new(agent_id, name, request.role.trim(), request.description.trim());
    profile.tags = request.tags;
    profile.guardrails = request.guardrails;
    profile.capabilities = request.capabilities;

    let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    profile.metadata.insert(CREATED_AT.to_string(), now.clone());
    profile.metadata.insert(UPDATED_AT.to_string(), now);
    Ok(profile)
}

/// What a foundry run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundryResult {
    pub agent_id: String,
    pub generated_files: Vec<PathBuf>,
    pub registry_path: PathBuf,
    pub outcome: UpsertOutcome,
}

/// Builds profiles, writes their documents and records them in the
/// registry
#[derive(Debug, Clone)]
pub struct AgentFoundry {
    scaffold: AgentScaffold,
    registry: AgentRegistry,
}

impl AgentFoundry {
    pub fn new(docs_root: impl Into<PathBuf>, registry_path: impl Into<PathBuf>) -> Self {
        Self {
            scaffold: AgentScaffold::new(docs_root),
            registry: AgentRegistry::new(registry_path),
        }
    }

    /// Foundry for a workspace, with configured paths resolved against
    /// `root`.
    pub fn from_config(root: &Path, config: &AgentsConfig) -> Self {
        Self::new(resolve(root, &config.docs_root), resolve(root, &config.registry))
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn execute(&self, request: AgentRequest) -> Result<FoundryResult> {
        let mut profile = build_agent_profile(request)?;

        // The generated profile.json must match what the registry keeps.
        if let Some(created) = self
            .registry
            .get(&profile.agent_id)
            .and_then(|existing| existing.created_at().cloned())
        {
            profile.metadata.insert(CREATED_AT.to_string(), created);
        }

        let generated_files = self.scaffold.generate(&profile)?;
        let agent_id = profile.agent_id.clone();
        let outcome = self.registry.upsert(profile)?;

        Ok(FoundryResult {
            agent_id,
            generated_files,
            registry_path: self.registry.path().to_path_buf(),
            outcome,
        })
    }
}
