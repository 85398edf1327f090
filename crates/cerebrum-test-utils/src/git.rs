//! Git repository fixtures built with the `git` CLI.
//!
//! Health reporting shells out to `git`, so fixtures do the same rather than
//! going through a library.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run `git <args>` in `path`, panicking with stderr on failure.
///
/// Returns trimmed stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits non-zero.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed in {}:\n{}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialises a real git repository with an initial commit.
///
/// Realism level: **REAL WITH HISTORY**: `main` branch, one commit, local
/// identity configured and signing disabled.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to create dir: {e}"));

    git(path, &["init"]);
    configure_identity(path);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
    // Best-effort: older git versions may not support this flag
    let _ = Command::new("git")
        .args(["branch", "-m", "main"])
        .current_dir(path)
        .output();
}

/// Commit a file with `content` at `relative` inside the repository.
///
/// # Panics
/// Panics if the write or any git operation fails.
pub fn commit_file(repo: &Path, relative: &str, content: &str, message: &str) {
    let target = repo.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|e| panic!("commit_file: {e}"));
    }
    fs::write(&target, content).unwrap_or_else(|e| panic!("commit_file: {e}"));
    git(repo, &["add", relative]);
    git(repo, &["commit", "-m", message]);
}

/// Clone `repo` into a bare remote at `remote` and set it as `origin` with
/// the current branch tracking it.
///
/// Afterwards the repository reports `# branch.upstream origin/main` and
/// `# branch.ab +0 -0`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn with_bare_upstream(repo: &Path, remote: &Path) {
    fs::create_dir_all(remote).unwrap_or_else(|e| panic!("with_bare_upstream: {e}"));
    git(remote, &["init", "--bare"]);
    let remote_str = remote.to_string_lossy();
    git(repo, &["remote", "add", "origin", &remote_str]);
    git(repo, &["push", "-u", "origin", "HEAD"]);
}

fn configure_identity(path: &Path) {
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}
