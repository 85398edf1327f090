//! Generated agent documents

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use cerebrum_fs::{NormalizedPath, io, json};

use crate::Result;
use crate::profile::AgentProfile;

/// Writes `<docs_root>/agents/<id>/README.md` and `profile.json`
#[derive(Debug, Clone)]
pub struct AgentScaffold {
    docs_root: PathBuf,
}

impl AgentScaffold {
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
        }
    }

    pub fn agent_dir(&self, agent_id: &str) -> PathBuf {
        self.docs_root.join("agents").join(agent_id)
    }

    /// Write the agent's documents, overwriting earlier versions.
    ///
    /// Returns the written paths.
    pub fn generate(&self, profile: &AgentProfile) -> Result<Vec<PathBuf>> {
        let dir = self.agent_dir(&profile.agent_id);
        let readme = dir.join("README.md");
        let profile_json = dir.join("profile.json");

        io::write_text(&NormalizedPath::new(&readme), &render_readme(profile))?;
        json::save_pretty(&NormalizedPath::new(&profile_json), profile)?;

        tracing::debug!(agent = %profile.agent_id, dir = %dir.display(), "Wrote agent documents");
        Ok(vec![readme, profile_json])
    }

    pub fn docs_root(&self) -> &Path {
        &self.docs_root
    }
}

/// README body: front matter, description, capabilities and guardrails.
pub fn render_readme(profile: &AgentProfile) -> String {
    let mut out = profile.to_frontmatter();
    let _ = write!(
        out,
        "\n\n# {}\n\n{}\n\n**Role:** {}\n\n## Capabilities\n\n",
        profile.name, profile.description, profile.role
    );

    if profile.capabilities.is_empty() {
        out.push_str("_No capabilities declared._\n");
    }
    for capability in &profile.capabilities {
        let _ = write!(out, "- **{}** (`{}`)", capability.name, capability.id);
        if !capability.description.is_empty() {
            let _ = write!(out, ": {}", capability.description);
        }
        out.push('\n');
    }

    out.push_str("\n## Guardrails\n\n");
    if profile.guardrails.is_empty() {
        out.push_str("_No guardrails declared._\n");
    }
    for guardrail in &profile.guardrails {
        let _ = writeln!(out, "- {guardrail}");
    }
    out
}
