//! Filesystem primitives for the cerebrum workspace tooling
//!
//! Provides forward-slash path handling, atomic writes, SHA-256 checksums,
//! tolerant JSON state documents and a format-agnostic config store.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod json;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
