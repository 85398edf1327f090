//! Health reporting against real git repositories

use cerebrum_health::{build_report, collect_repo_status, render_summary};
use cerebrum_test_utils::git::{commit_file, git, real_git_repo_with_commit, with_bare_upstream};
use tempfile::TempDir;

#[test]
fn fresh_repository_is_clean() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());

    let status = collect_repo_status("workspace", temp.path()).unwrap();
    assert!(status.clean);
    assert_eq!(status.summary(), "clean");
    assert_eq!(status.branch, "main");
    assert_eq!(status.upstream, None);
    assert!(!status.head.is_empty());
}

#[test]
fn untracked_file_makes_repository_dirty() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());
    std::fs::write(temp.path().join("scratch.txt"), "wip").unwrap();

    let status = collect_repo_status("workspace", temp.path()).unwrap();
    assert!(!status.clean);
    assert_eq!(status.summary(), "dirty");
    assert_eq!(status.dirty_lines, vec!["? scratch.txt".to_string()]);
}

#[test]
fn unpushed_commit_is_ahead() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    real_git_repo_with_commit(&repo);
    with_bare_upstream(&repo, &temp.path().join("remote.git"));
    commit_file(&repo, "CHANGELOG.md", "- change\n", "Add changelog");

    let status = collect_repo_status("workspace", &repo).unwrap();
    assert!(status.clean);
    assert_eq!(status.ahead, 1);
    assert_eq!(status.upstream.as_deref(), Some("origin/main"));
    assert_eq!(status.summary(), "ahead +1");
}

#[test]
fn declared_submodules_are_reported_and_missing_ones_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    real_git_repo_with_commit(root);
    real_git_repo_with_commit(&root.join("libs/core"));
    std::fs::write(root.join("libs/core/dirty.txt"), "x").unwrap();
    std::fs::write(
        root.join(".gitmodules"),
        "[submodule \"core\"]\n\tpath = libs/core\n\turl = ../core.git\n\
         [submodule \"ghost\"]\n\tpath = libs/ghost\n\turl = ../ghost.git\n",
    )
    .unwrap();
    git(root, &["add", ".gitmodules"]);
    git(root, &["commit", "-m", "Declare submodules"]);

    let report = build_report(root, false).unwrap();
    assert_eq!(report.submodules.len(), 1);
    assert_eq!(report.submodules[0].name, "core");
    assert!(!report.submodules[0].clean);
    assert!(report.autofix_log.is_empty());

    let summary = render_summary(&report);
    assert!(summary.contains("submodules needing attention: 1/1"));
    assert!(summary.contains("- core: dirty"));
}

#[test]
fn workspace_without_gitmodules_has_no_submodules() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());

    let report = build_report(temp.path(), true).unwrap();
    assert!(report.submodules.is_empty());
    assert!(render_summary(&report).contains("all submodules clean"));
    assert_eq!(report.to_json()["root"]["clean"], true);
}
