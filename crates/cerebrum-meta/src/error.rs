//! Error types for cerebrum-meta

/// Result type for cerebrum-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration or setting up logging
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error from cerebrum-fs
    #[error(transparent)]
    Fs(#[from] cerebrum_fs::Error),

    /// Invalid log filter directive
    #[error("Invalid log filter '{directive}': {message}")]
    LogFilter { directive: String, message: String },

    /// A global subscriber was already installed
    #[error("Logging already initialised: {0}")]
    LoggingInit(String),
}
