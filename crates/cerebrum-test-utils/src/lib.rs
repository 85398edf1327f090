//! Shared test utilities for the cerebrum workspace tooling.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: real git repositories built with the `git` CLI
//! - [`workspace`]: [`TestWorkspace`](workspace::TestWorkspace) builder for
//!   manifests, scripts and state files

pub mod git;
pub mod workspace;
