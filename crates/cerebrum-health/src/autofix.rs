//! Submodule repair pass

use std::path::Path;

use crate::status::run_git;

const COMMANDS: [&[&str]; 2] = [
    &["submodule", "sync", "--recursive"],
    &["submodule", "update", "--init", "--recursive"],
];

/// Sync and initialise submodules under `root`.
///
/// Failures are logged and returned as log lines; they never abort.
pub fn autofix(root: &Path) -> Vec<String> {
    let mut logs = Vec::new();
    for args in COMMANDS {
        match run_git(args, root) {
            Ok(output) => {
                if !output.status.success() {
                    tracing::warn!(args = ?args, code = ?output.status.code(), "Autofix step failed");
                }
                for stream in [&output.stdout, &output.stderr] {
                    let text = String::from_utf8_lossy(stream).trim().to_string();
                    if !text.is_empty() {
                        logs.push(text);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Autofix step could not run");
                logs.push(e.to_string());
            }
        }
    }
    logs
}
