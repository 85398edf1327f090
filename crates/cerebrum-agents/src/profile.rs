//! Agent profile records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key recording when the profile was first scaffolded
pub const CREATED_AT: &str = "created_at";
/// Metadata key recording the latest scaffold run
pub const UPDATED_AT: &str = "updated_at";

/// Something an agent can do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapability {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_owner() -> String {
    "platform-ops".to_string()
}

fn default_status() -> String {
    "draft".to_string()
}

/// Profile of one agent, as stored in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent_id: String,
    pub name: String,
    pub role: String,
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub capabilities: Vec<AgentCapability>,
    #[serde(default)]
    pub model_config: Map<String, Value>,
    #[serde(default)]
    pub guardrails: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AgentProfile {
    /// A draft profile with default version, owner and status.
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            role: role.into(),
            description: description.into(),
            version: default_version(),
            owner: default_owner(),
            status: default_status(),
            capabilities: Vec::new(),
            model_config: Map::new(),
            guardrails: Vec::new(),
            tags: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Front-matter header for the agent's README.
    ///
    /// Field order is fixed; tags are always emitted as a (possibly empty)
    /// list.
    pub fn to_frontmatter(&self) -> String {
        let mut lines = vec![
            "---".to_string(),
            format!("id: {}", self.agent_id),
            format!("title: {}", self.name),
            format!("role: {}", self.role),
            format!("version: {}", self.version),
            format!("owner: {}", self.owner),
            format!("status: {}", self.status),
            "tags:".to_string(),
        ];
        lines.extend(self.tags.iter().map(|tag| format!("  - {tag}")));
        lines.push("---".to_string());
        lines.join("\n")
    }

    pub fn created_at(&self) -> Option<&Value> {
        self.metadata.get(CREATED_AT)
    }
}
