//! Change-driven template validation.
//!
//! Watch targets are hashed and compared with the digests recorded by the
//! last successful run; the validation command only runs when something
//! changed, when forced, or when no run was ever recorded. Each run leaves a
//! log file and a JSON summary under a timestamped run id.
//!
//! A best-effort python alignment probe checks whether the canonical
//! interpreter can install the project's requirements when an override pins
//! a lower version.

pub mod error;
pub mod hashing;
pub mod probe;
pub mod runner;
pub mod state;
pub mod version;

pub use error::{Error, Result};
pub use hashing::{changed_targets, compute_hashes};
pub use probe::{ProbeDecision, PythonProbe};
pub use runner::{CheckReport, Evergreen, EvergreenOutcome, RunOptions};
pub use state::{EvergreenState, ProbeStatus, ProbeStep, ProbeSummary, RunStatus, RunSummary};
pub use version::version_tuple;
