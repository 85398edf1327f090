//! Workspace and submodule health reporting.
//!
//! Queries `git status --porcelain=2 --branch` for the root repository and
//! every submodule declared in `.gitmodules`, then renders a human summary
//! and an optional JSON payload. Nothing is mutated unless autofix is
//! requested.

pub mod autofix;
pub mod error;
pub mod gitmodules;
pub mod report;
pub mod status;

pub use autofix::autofix;
pub use error::{Error, Result};
pub use gitmodules::{Submodule, parse_gitmodules};
pub use report::{WorkspaceReport, build_report, render_summary};
pub use status::{RepoStatus, StatusFields, collect_repo_status, parse_status};
