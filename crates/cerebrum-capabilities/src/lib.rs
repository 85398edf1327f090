//! Capability manifests, module registry and guarded execution.
//!
//! A *capability* is a declared operation backed by an entrypoint script.
//! Capabilities are grouped into modules, either listed by a federation
//! manifest or loaded from one standalone manifest, and collected into a
//! [`ModuleRegistry`]. The [`Executor`] runs an invocation as a
//! time-limited subprocess with an allow-listed environment and classifies
//! the result by exit code.
//!
//! ```text
//! federation_manifest.json ─┐
//!                           ├─> ModuleRegistry ──> Executor ──> subprocess
//! <module>/manifest.json ───┘         │
//!                                     └─> introspection (index, modules, health)
//! ```

pub mod error;
pub mod executor;
pub mod federation;
pub mod introspect;
pub mod manifest;
pub mod registry;
pub mod schema;

pub use error::{Error, Result};
pub use executor::{Executor, InvocationOutcome, InvocationStatus};
pub use federation::{FederatedModule, FederationManifest, HealthCommand};
pub use introspect::{CapabilityMeta, GuardrailSummary, ModuleHealthSnapshot, ModuleIndexEntry};
pub use manifest::{Capability, CapabilityManifest, CapabilityMetadata, Guardrails};
pub use registry::{ModuleRegistry, ModuleRuntime, RegistryConfig, tool_name};
pub use schema::{ArgumentIssue, ArgumentSchema, Extras, FieldDescriptor, FieldKind, ValidationError};
