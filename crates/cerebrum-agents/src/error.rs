//! Error types for cerebrum-agents

use std::path::PathBuf;

use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] cerebrum_fs::Error),

    #[error("Agent id '{0}' must be a kebab-case slug (e.g. watcher-01)")]
    InvalidAgentId(String),

    #[error("Agent {field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("Failed to parse capabilities file {path}: {message}")]
    CapabilitiesParse { path: PathBuf, message: String },

    #[error("Capabilities file must be a list or include 'capabilities': {path}")]
    InvalidCapabilitiesShape { path: PathBuf },

    #[error("Agent registry {path} is not valid JSON: {message}")]
    RegistryParse { path: PathBuf, message: String },

    #[error("Invalid capability at index {index}: {message}")]
    InvalidCapability { index: usize, message: String },
}
