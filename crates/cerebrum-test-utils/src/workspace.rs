//! [`TestWorkspace`] builder for cerebrum test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary workspace root with helpers for writing manifests, scripts
/// and state files, and for asserting on the results.
///
/// # Example
///
/// ```rust,no_run
/// use cerebrum_test_utils::workspace::TestWorkspace;
/// use serde_json::json;
///
/// let ws = TestWorkspace::new();
/// ws.write_script("tools/hello.sh", "echo hello");
/// ws.write_json(
///     "mod/manifest.json",
///     &json!({"capabilities": [{"id": "demo.hello", "summary": "Say hi", "entrypoint": "tools/hello.sh"}]}),
/// );
/// ws.assert_file_exists("tools/hello.sh");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary workspace.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root path of the workspace.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the workspace.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a text file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let target = self.path(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&target, content).unwrap();
        target
    }

    /// Write a pretty-printed JSON document.
    pub fn write_json(&self, relative: &str, value: &Value) -> PathBuf {
        let content = serde_json::to_string_pretty(value).unwrap();
        self.write(relative, &format!("{content}\n"))
    }

    /// Write a bash script with a shebang and mark it executable.
    pub fn write_script(&self, relative: &str, body: &str) -> PathBuf {
        let target = self.write(relative, &format!("#!/usr/bin/env bash\n{body}\n"));
        make_executable(&target);
        target
    }

    /// Create a directory (and parents).
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let target = self.path(relative);
        fs::create_dir_all(&target).unwrap();
        target
    }

    /// Read a file as text.
    pub fn read(&self, relative: &str) -> String {
        let full_path = self.path(relative);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Read and parse a JSON document.
    pub fn read_json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    /// Assert that `path` (relative to the workspace root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the workspace root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).unwrap();
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
