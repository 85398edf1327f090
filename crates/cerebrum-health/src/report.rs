//! Workspace-level report and rendering

use std::fmt::Write as _;
use std::path::Path;

use serde_json::{Value, json};

use crate::gitmodules::parse_gitmodules;
use crate::status::{RepoStatus, collect_repo_status};
use crate::{Error, Result, autofix};

/// Change lines shown for the root repository
const ROOT_LINES: usize = 10;
/// Change lines shown per submodule
const SUBMODULE_LINES: usize = 5;

/// Root repository plus every present submodule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceReport {
    pub root: RepoStatus,
    pub submodules: Vec<RepoStatus>,
    /// Output of the autofix pass, empty when it did not run
    pub autofix_log: Vec<String>,
}

impl WorkspaceReport {
    /// Submodules that are dirty or diverged.
    pub fn needing_attention(&self) -> impl Iterator<Item = &RepoStatus> {
        self.submodules.iter().filter(|repo| repo.needs_attention())
    }

    /// `{root, submodules}` payload.
    pub fn to_json(&self) -> Value {
        json!({
            "root": self.root,
            "submodules": self.submodules,
        })
    }
}

/// Collect status for `root` and its declared submodules.
///
/// Submodules whose checkout path does not exist are skipped.
pub fn build_report(root: &Path, run_autofix: bool) -> Result<WorkspaceReport> {
    let autofix_log = if run_autofix {
        autofix(root)
    } else {
        Vec::new()
    };

    let gitmodules = root.join(".gitmodules");
    let declared = match std::fs::read_to_string(&gitmodules) {
        Ok(text) => parse_gitmodules(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(source) => {
            return Err(Error::Read {
                path: gitmodules,
                source,
            });
        }
    };

    let root_status = collect_repo_status("workspace", root)?;
    let mut submodules = Vec::new();
    for module in &declared {
        let path = root.join(module.path());
        if !path.exists() {
            tracing::debug!(name = %module.name, path = %path.display(), "Skipping absent submodule");
            continue;
        }
        submodules.push(collect_repo_status(&module.name, &path)?);
    }

    Ok(WorkspaceReport {
        root: root_status,
        submodules,
        autofix_log,
    })
}

/// Human-readable multi-line summary.
pub fn render_summary(report: &WorkspaceReport) -> String {
    let mut out = String::new();
    let root = &report.root;
    let _ = writeln!(
        out,
        "workspace: {} (branch {}, HEAD {})",
        root.summary(),
        root.branch,
        root.head
    );
    if !root.dirty_lines.is_empty() {
        out.push_str("  root changes:\n");
        for line in root.dirty_lines.iter().take(ROOT_LINES) {
            let _ = writeln!(out, "    {line}");
        }
    }

    let attention: Vec<&RepoStatus> = report.needing_attention().collect();
    if attention.is_empty() {
        out.push_str("all submodules clean\n");
    } else {
        let _ = writeln!(
            out,
            "submodules needing attention: {}/{}",
            attention.len(),
            report.submodules.len()
        );
        for repo in attention {
            let _ = writeln!(
                out,
                "- {}: {} (branch {}, HEAD {})",
                repo.name,
                repo.summary(),
                repo.branch,
                repo.head
            );
            for line in repo.dirty_lines.iter().take(SUBMODULE_LINES) {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
    out
}
