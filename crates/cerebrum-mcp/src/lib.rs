//! Capability tool server
//!
//! Exposes the enabled capabilities of a [`ModuleRegistry`] as tools over
//! JSON-RPC 2.0 on stdio, alongside four introspection tools.
//!
//! ```text
//! [ client ]
//!     | (JSON-RPC, one message per line)
//!     v
//! [ CapabilityServer ] --> ModuleRegistry (ids, schemas, metadata)
//!     |
//!     v
//! [ Executor ] --> guarded subprocess per call
//! ```
//!
//! Logs go to stderr so stdout carries only protocol traffic.
//!
//! [`ModuleRegistry`]: cerebrum_capabilities::ModuleRegistry

pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::CapabilityServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, tool_definitions};
