//! Per-repository git status

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Serialize;

use crate::{Error, Result};

/// Fields extracted from `git status --porcelain=2 --branch`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFields {
    pub dirty: Vec<String>,
    pub ahead: u32,
    pub behind: u32,
    pub branch: Option<String>,
    pub upstream: Option<String>,
}

/// Parse porcelain v2 output.
///
/// `# branch.*` headers fill the branch fields; every line not starting with
/// `#` is a change line. A malformed `# branch.ab` line is ignored.
pub fn parse_status(output: &str) -> StatusFields {
    let mut fields = StatusFields::default();
    for line in output.lines() {
        if let Some(payload) = line.strip_prefix("# branch.ab ") {
            if let Some((ahead, behind)) = parse_ab(payload) {
                fields.ahead = ahead;
                fields.behind = behind;
            }
        } else if line.starts_with("# branch.head") {
            fields.branch = line.split_whitespace().last().map(str::to_string);
        } else if line.starts_with("# branch.upstream") {
            fields.upstream = line.split_whitespace().last().map(str::to_string);
        } else if !line.starts_with('#') && !line.is_empty() {
            fields.dirty.push(line.to_string());
        }
    }
    fields
}

fn parse_ab(payload: &str) -> Option<(u32, u32)> {
    let mut parts = payload.split_whitespace();
    let ahead = parts.next()?.strip_prefix('+')?.parse().ok()?;
    let behind = parts.next()?.strip_prefix('-')?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ahead, behind))
}

/// Status of one repository, recomputed on every invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub name: String,
    pub path: PathBuf,
    pub clean: bool,
    pub ahead: u32,
    pub behind: u32,
    pub branch: String,
    pub upstream: Option<String>,
    pub head: String,
    #[serde(rename = "dirty")]
    pub dirty_lines: Vec<String>,
}

impl RepoStatus {
    /// `clean`, or a comma-joined list of `dirty`, `ahead +N`, `behind -N`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.clean {
            parts.push("dirty".to_string());
        }
        if self.ahead > 0 {
            parts.push(format!("ahead +{}", self.ahead));
        }
        if self.behind > 0 {
            parts.push(format!("behind -{}", self.behind));
        }
        if parts.is_empty() {
            "clean".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Dirty, or diverged from upstream.
    pub fn needs_attention(&self) -> bool {
        !self.clean || self.ahead > 0 || self.behind > 0
    }
}

/// Query git for the status of the repository at `path`.
pub fn collect_repo_status(name: &str, path: &Path) -> Result<RepoStatus> {
    let status = run_git(&["status", "--porcelain=2", "--branch"], path)?;
    let fields = parse_status(&String::from_utf8_lossy(&status.stdout));
    let head = run_git(&["rev-parse", "--short", "HEAD"], path)?;

    Ok(RepoStatus {
        name: name.to_string(),
        path: path.to_path_buf(),
        clean: fields.dirty.is_empty(),
        ahead: fields.ahead,
        behind: fields.behind,
        branch: fields.branch.unwrap_or_else(|| "unknown".to_string()),
        upstream: fields.upstream,
        head: String::from_utf8_lossy(&head.stdout).trim().to_string(),
        dirty_lines: fields.dirty,
    })
}

/// Run git, capturing output. A non-zero exit is not an error here.
pub(crate) fn run_git(args: &[&str], cwd: &Path) -> Result<Output> {
    tracing::debug!(args = ?args, cwd = %cwd.display(), "git");
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| Error::Git {
            args: args.join(" "),
            cwd: cwd.to_path_buf(),
            source,
        })
}
