//! Agent command implementations

use std::path::{Path, PathBuf};

use cerebrum_agents::{AgentFoundry, AgentRegistry, AgentRequest, load_capabilities_file};
use cerebrum_fs::NormalizedPath;
use cerebrum_meta::WorkspaceConfig;
use cerebrum_meta::config::resolve;
use colored::Colorize;

use crate::error::Result;

/// Flags of `agent scaffold`
#[derive(Debug, Clone)]
pub struct ScaffoldArgs {
    pub name: String,
    pub role: String,
    pub description: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub guardrails: Vec<String>,
    pub capabilities: Option<PathBuf>,
}

/// Build, document and register an agent.
pub fn run_agent_scaffold(root: &Path, args: ScaffoldArgs) -> Result<()> {
    let config = WorkspaceConfig::load(root);
    let capabilities = match &args.capabilities {
        Some(path) => load_capabilities_file(&resolve(root, path))?,
        None => Vec::new(),
    };

    let foundry = AgentFoundry::from_config(root, &config.agents);
    let result = foundry.execute(AgentRequest {
        agent_id: args.name,
        name: args.title,
        role: args.role,
        description: args.description,
        tags: args.tags,
        guardrails: args.guardrails,
        capabilities,
    })?;

    println!(
        "{} Scaffolded agent {} ({:?})",
        "=>".green().bold(),
        result.agent_id.cyan(),
        result.outcome
    );
    for file in &result.generated_files {
        println!("  {} {}", "+".green(), NormalizedPath::new(file).relative_to(root));
    }
    println!(
        "  {}: {}",
        "registry".dimmed(),
        NormalizedPath::new(&result.registry_path).relative_to(root)
    );
    Ok(())
}

/// Print `id<TAB>status<TAB>name` per registered agent.
pub fn run_agent_list(root: &Path) -> Result<()> {
    let config = WorkspaceConfig::load(root);
    let registry = AgentRegistry::new(resolve(root, &config.agents.registry));

    let agents = registry.list();
    if agents.is_empty() {
        println!(
            "No agents registered yet. Run {} to add one.",
            "cerebrum agent scaffold ...".cyan()
        );
        return Ok(());
    }
    for profile in agents {
        println!("{}\t{}\t{}", profile.agent_id, profile.status, profile.name);
    }
    Ok(())
}
