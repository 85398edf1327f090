//! JSON-backed agent registry
//!
//! The registry file holds `{"agents": {<agent_id>: <profile>}}`. Keys are
//! kept sorted so rewrites produce stable diffs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cerebrum_fs::{NormalizedPath, io, json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::profile::{AgentProfile, CREATED_AT};
use crate::{Error, Result};

/// Entries stay raw so one malformed profile never hides or drops the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    agents: BTreeMap<String, Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Whether an upsert added or replaced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct AgentRegistry {
    path: PathBuf,
}

impl AgentRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registry document for reading; unreadable files read as empty.
    fn load(&self) -> RegistryDocument {
        json::load_or_default(&NormalizedPath::new(&self.path))
    }

    /// Registry document for rewriting. A file that exists but does not
    /// parse is an error, so its entries are never replaced wholesale.
    fn load_for_update(&self) -> Result<RegistryDocument> {
        let path = NormalizedPath::new(&self.path);
        if !path.exists() {
            return Ok(RegistryDocument::default());
        }
        let content = io::read_text(&path)?;
        if content.trim().is_empty() {
            return Ok(RegistryDocument::default());
        }
        serde_json::from_str(&content).map_err(|e| Error::RegistryParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// All well-formed profiles, sorted by agent id. A missing registry is
    /// empty; malformed entries are logged and skipped.
    pub fn list(&self) -> Vec<AgentProfile> {
        self.load()
            .agents
            .into_iter()
            .filter_map(|(id, entry)| decode(&id, entry))
            .collect()
    }

    pub fn get(&self, agent_id: &str) -> Option<AgentProfile> {
        let entry = self.load().agents.remove(agent_id)?;
        decode(agent_id, entry)
    }

    /// Insert or replace a profile.
    ///
    /// A replacement overwrites every field except `metadata.created_at`,
    /// which keeps the value recorded when the agent was first registered.
    /// Other entries are written back untouched, malformed or not.
    pub fn upsert(&self, mut profile: AgentProfile) -> Result<UpsertOutcome> {
        let mut document = self.load_for_update()?;
        let outcome = match document.agents.get(&profile.agent_id) {
            Some(existing) => {
                if let Some(created) = existing.pointer("/metadata/created_at") {
                    profile
                        .metadata
                        .insert(CREATED_AT.to_string(), created.clone());
                }
                UpsertOutcome::Updated
            }
            None => UpsertOutcome::Created,
        };

        tracing::info!(agent = %profile.agent_id, outcome = ?outcome, registry = %self.path.display(), "Upserting agent");
        let entry = serde_json::to_value(&profile).map_err(|e| Error::RegistryParse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        document.agents.insert(profile.agent_id.clone(), entry);
        json::save_pretty(&NormalizedPath::new(&self.path), &document)?;
        Ok(outcome)
    }
}

fn decode(agent_id: &str, entry: Value) -> Option<AgentProfile> {
    match serde_json::from_value(entry) {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(agent = %agent_id, error = %e, "Skipping malformed registry entry");
            None
        }
    }
}
