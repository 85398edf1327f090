//! cerebrum CLI
//!
//! Change-driven template validation, workspace health reporting and agent
//! scaffolding for a federated multi-repository workspace.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;

use cerebrum_evergreen::RunOptions;
use cli::{AgentAction, Cli, Commands};
use commands::ScaffoldArgs;
use error::{CliError, Result};

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = cerebrum_meta::logging::init(default_level) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(root = %cli.root.display(), "Verbose mode enabled");

    if !cli.root.is_dir() {
        return Err(CliError::user(format!(
            "Workspace root not found: {}",
            cli.root.display()
        )));
    }

    match cli.command {
        Some(cmd) => execute_command(&cli.root, cmd),
        None => {
            println!("{} workspace tooling", "cerebrum".green().bold());
            println!();
            println!("Run {} for available commands.", "cerebrum --help".cyan());
            Ok(0)
        }
    }
}

fn execute_command(root: &std::path::Path, cmd: Commands) -> Result<i32> {
    match cmd {
        Commands::Evergreen {
            templates,
            force_rebuild,
            force,
            check_only,
        } => commands::run_evergreen(
            root,
            RunOptions {
                templates,
                force_rebuild,
                force,
                check_only,
            },
        ),
        Commands::Health { json, autofix } => commands::run_health(root, json, autofix).map(|()| 0),
        Commands::Agent { action } => match action {
            AgentAction::Scaffold {
                name,
                role,
                description,
                title,
                tags,
                guardrails,
                capabilities,
            } => commands::run_agent_scaffold(
                root,
                ScaffoldArgs {
                    name,
                    role,
                    description,
                    title,
                    tags,
                    guardrails,
                    capabilities,
                },
            )
            .map(|()| 0),
            AgentAction::List => commands::run_agent_list(root).map(|()| 0),
        },
    }
}
