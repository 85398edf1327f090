//! Error types for the capability server

use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the server or reject a request outright
#[derive(Debug, Error)]
pub enum Error {
    /// Registry or manifest failure
    #[error(transparent)]
    Capabilities(#[from] cerebrum_capabilities::Error),

    /// Logging setup failure
    #[error(transparent)]
    Meta(#[from] cerebrum_meta::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error on the stdio transport
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A capability maps onto a built-in tool name
    #[error("capability '{capability}' collides with built-in tool '{tool}'")]
    ReservedToolName { capability: String, tool: String },

    /// Unknown tool requested
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Conflicting or malformed command-line flags
    #[error("{0}")]
    Usage(String),
}
