//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Workspace automation: change-driven validation, health and agents
#[derive(Parser, Debug)]
#[command(name = "cerebrum")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root
    #[arg(long, global = true, default_value = ".", env = "CEREBRUM_ROOT")]
    pub root: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Re-run template validation when watched manifests change
    ///
    /// Examples:
    ///   cerebrum evergreen --check-only
    ///   cerebrum evergreen --templates python-service --force
    Evergreen {
        /// Limit validation to a template (repeatable)
        #[arg(long = "templates", value_name = "TEMPLATE")]
        templates: Vec<String>,

        /// Force rebuild of template render caches
        #[arg(long)]
        force_rebuild: bool,

        /// Validate even when no watched file changed
        #[arg(long)]
        force: bool,

        /// Only report whether validation is required
        #[arg(long)]
        check_only: bool,
    },

    /// Summarize git status of the workspace and its submodules
    Health {
        /// Emit a JSON payload after the summary
        #[arg(long)]
        json: bool,

        /// Sync and update submodules before reporting
        #[arg(long)]
        autofix: bool,
    },

    /// Manage agent profiles
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },
}

/// Agent subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// Create or update an agent profile
    Scaffold {
        /// Agent slug (kebab-case)
        #[arg(long)]
        name: String,

        /// Agent primary role
        #[arg(long)]
        role: String,

        /// Short description of the agent
        #[arg(long)]
        description: String,

        /// Human readable title (defaults to the slug)
        #[arg(long)]
        title: Option<String>,

        /// Tag to add (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Guardrail entry to add (repeatable)
        #[arg(long = "guardrail")]
        guardrails: Vec<String>,

        /// JSON file with capability definitions
        #[arg(long)]
        capabilities: Option<PathBuf>,
    },

    /// List registered agents
    List,
}
