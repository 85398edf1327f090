//! Error types for cerebrum-evergreen

use std::path::PathBuf;

/// Result type for evergreen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an evergreen invocation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] cerebrum_fs::Error),

    #[error("Project directory not found at {path}")]
    ProjectMissing { path: PathBuf },

    #[error("Required file for {key} not found: {path}")]
    WatchTargetMissing { key: String, path: PathBuf },

    #[error("Validation command is empty")]
    EmptyCommand,

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
