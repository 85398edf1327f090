//! Workspace configuration and logging for the cerebrum tooling.
//!
//! Every utility reads the same optional `.cerebrum/config.toml` through
//! [`WorkspaceConfig::load`] and initialises logging through
//! [`logging::init`].

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    AgentsConfig, CONFIG_PATH, CapabilitiesConfig, EvergreenConfig, ProbeConfig, WorkspaceConfig,
};
pub use error::{Error, Result};
