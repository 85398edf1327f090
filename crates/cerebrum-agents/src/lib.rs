//! Agent profiles, generated agent documents and the JSON agent registry.

pub mod capabilities;
pub mod error;
pub mod foundry;
pub mod profile;
pub mod registry;
pub mod scaffold;

pub use capabilities::{load_capabilities_file, parse_capabilities};
pub use error::{Error, Result};
pub use foundry::{AgentFoundry, AgentRequest, FoundryResult, build_agent_profile};
pub use profile::{AgentCapability, AgentProfile};
pub use registry::{AgentRegistry, UpsertOutcome};
pub use scaffold::{AgentScaffold, render_readme};
