//! Error types for cerebrum-capabilities

use std::path::PathBuf;

use crate::schema::ValidationError;

/// Result type for capability operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal registry and manifest errors.
///
/// Failures of a capability's own process are not errors; they are reported
/// through [`InvocationOutcome`](crate::InvocationOutcome).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] cerebrum_fs::Error),

    #[error("Federation manifest not found: {path}")]
    FederationMissing { path: PathBuf },

    #[error("Capability manifest not found: {path}")]
    ManifestMissing { path: PathBuf },

    #[error("Unknown module ids in filter: {ids}")]
    UnknownModules { ids: String },

    #[error("No modules available for registration")]
    NoModules,

    #[error("Capability id '{id}' defined in multiple modules ({first}, {second})")]
    DuplicateCapability {
        id: String,
        first: String,
        second: String,
    },

    #[error("Tool name '{name}' produced by both '{first}' and '{second}'")]
    DuplicateToolName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Entrypoint {entrypoint} of '{capability}' is outside its allowed roots")]
    EntrypointOutsideRoots {
        capability: String,
        entrypoint: PathBuf,
    },

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error(transparent)]
    InvalidArguments(#[from] ValidationError),
}
