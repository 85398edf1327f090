//! Capability MCP server
//!
//! # Usage
//!
//! ```bash
//! cerebrum-mcp [--root <path>] [--federation <path>] [--module <id>]...
//! cerebrum-mcp --manifest <path> [--module-id <id>]
//! cerebrum-mcp --list | --list-modules
//! ```
//!
//! # Environment Variables
//!
//! - `CEREBRUM_LOG` / `RUST_LOG`: log filter (default: `info`)
//!
//! Requests and responses go through stdin/stdout; logs go to stderr.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

use cerebrum_capabilities::{Executor, ModuleRegistry, RegistryConfig};
use cerebrum_mcp::{CapabilityServer, Error, Result};
use cerebrum_meta::{WorkspaceConfig, logging};
use clap::Parser;

/// JSON-RPC server exposing workspace capabilities as tools
#[derive(Parser, Debug)]
#[command(name = "cerebrum-mcp")]
#[command(version)]
struct Args {
    /// Workspace root
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// List capability ids and exit
    #[arg(long)]
    list: bool,

    /// List loaded modules and exit
    #[arg(long)]
    list_modules: bool,

    /// Federation manifest (default from workspace config)
    #[arg(long)]
    federation: Option<PathBuf>,

    /// Restrict to a module id (repeatable)
    #[arg(long = "module", value_name = "ID")]
    modules: Vec<String>,

    /// Serve a single manifest outside the federation
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Module id for --manifest (default: manifest file stem)
    #[arg(long)]
    module_id: Option<String>,
}

impl Args {
    fn module_filter(&self) -> BTreeSet<String> {
        self.modules
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn registry_config(&self, config: &WorkspaceConfig) -> Result<RegistryConfig> {
        let filter = self.module_filter();
        if self.manifest.is_some() && !filter.is_empty() {
            return Err(Error::Usage(
                "--module cannot be combined with --manifest".to_string(),
            ));
        }

        if let Some(manifest) = &self.manifest {
            return Ok(RegistryConfig::Single {
                manifest: manifest.clone(),
                module_id: self.module_id.clone(),
            });
        }
        if self.module_id.is_some() && filter.is_empty() {
            return Ok(RegistryConfig::Single {
                manifest: config.capabilities.default_manifest.clone(),
                module_id: self.module_id.clone(),
            });
        }

        Ok(RegistryConfig::Federation {
            path: self
                .federation
                .clone()
                .unwrap_or_else(|| config.capabilities.federation_manifest.clone()),
            filter: (!filter.is_empty()).then_some(filter),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init("info") {
        eprintln!("warning: {e}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = WorkspaceConfig::load(&args.root);
    let registry_config = args.registry_config(&config)?;

    tracing::info!(root = %args.root.display(), config = ?registry_config, "Starting cerebrum-mcp");

    let registry = ModuleRegistry::from_config(&registry_config, &args.root)?;

    if args.list_modules {
        for module in registry.module_index() {
            println!(
                "{}: {} ({}/{}) -> {}",
                module.id,
                module.summary,
                module.capability_enabled,
                module.capability_total,
                module.manifest
            );
        }
        return Ok(());
    }

    if args.list {
        for id in registry.capability_ids() {
            println!("{id}");
        }
        return Ok(());
    }

    let executor = Executor::new(registry.root(), &config.capabilities);
    let server = CapabilityServer::new(registry, executor)?;
    server.run().await
}
