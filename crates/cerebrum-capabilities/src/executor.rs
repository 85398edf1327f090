//! Guarded capability execution.
//!
//! Each invocation runs the capability's entrypoint as a child process with
//! a cleared environment, a wall-clock limit and exit-code classification.
//! Process failures are reported as data, never as errors.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, LazyLock, Mutex};
use std::time::{Duration, Instant};

use cerebrum_meta::CapabilitiesConfig;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::manifest::Capability;
use crate::registry::ModuleRuntime;

/// Characters of stdout/stderr kept, counted from the end
const OUTPUT_TAIL: usize = 8000;

/// How long to wait for pipes to close once the child is gone
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Ok,
    Error,
    Timeout,
}

/// Result of one capability invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationOutcome {
    pub status: InvocationStatus,
    /// Exit code, or the negated signal number when killed
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Shell-quoted command line
    pub command: String,
    /// Seconds, rounded to milliseconds
    pub duration: f64,
    pub timed_out: bool,
    pub module: String,
}

/// Runs capabilities for one workspace
#[derive(Debug, Clone)]
pub struct Executor {
    root: PathBuf,
    python: String,
    shell: String,
}

impl Executor {
    pub fn new(root: impl Into<PathBuf>, config: &CapabilitiesConfig) -> Self {
        Self {
            root: root.into(),
            python: config.python.clone(),
            shell: config.shell.clone(),
        }
    }

    /// Command line for an entrypoint, chosen by extension.
    pub fn command_for(&self, entrypoint: &Path) -> Vec<String> {
        let path = entrypoint.to_string_lossy().into_owned();
        match entrypoint.extension().and_then(|e| e.to_str()) {
            Some("py") => vec![self.python.clone(), path],
            Some("sh") => vec![self.shell.clone(), path],
            _ if is_executable(entrypoint) => vec![path],
            _ => vec![self.shell.clone(), path],
        }
    }

    /// Environment for the child: allow-listed variables from this process
    /// plus the injected capability context.
    pub fn environment(
        &self,
        module: &ModuleRuntime,
        capability: &Capability,
        arguments: &Map<String, Value>,
    ) -> Vec<(String, OsString)> {
        let mut env: Vec<(String, OsString)> = capability
            .guardrails
            .allowed_env
            .iter()
            .filter_map(|key| std::env::var_os(key).map(|value| (key.clone(), value)))
            .collect();

        let manifest = cerebrum_fs::NormalizedPath::new(&module.manifest_path).relative_to(&self.root);
        let inputs = Value::Object(arguments.clone()).to_string();
        env.push(("WORKSPACE_ROOT".into(), self.root.clone().into_os_string()));
        env.push(("CAPABILITY_ID".into(), capability.id.clone().into()));
        env.push(("CAPABILITY_MODULE".into(), module.id.clone().into()));
        env.push(("CAPABILITY_MANIFEST".into(), manifest.into()));
        env.push(("CAPABILITY_INPUTS".into(), inputs.into()));
        for (key, value) in arguments {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            env.push((format!("INPUT_{}", upper_snake(key)), text.into()));
        }
        env
    }

    /// Run `capability` with already-validated `arguments`.
    pub async fn invoke(
        &self,
        module: &ModuleRuntime,
        capability: &Capability,
        arguments: &Map<String, Value>,
    ) -> InvocationOutcome {
        let entrypoint = capability.resolved_entrypoint(&module.workdir, &module.manifest_dir);
        let argv = self.command_for(&entrypoint);
        let env = self.environment(module, capability, arguments);
        let limit = Duration::from_secs(capability.guardrails.max_runtime_seconds);

        tracing::info!(
            capability = %capability.id,
            module = %module.id,
            command = ?argv,
            inputs = ?arguments.keys().collect::<Vec<_>>(),
            "capability_start"
        );

        let start = Instant::now();
        let run = run_with_limit(&argv, &module.workdir, env, limit).await;
        let duration = (start.elapsed().as_secs_f64() * 1000.0).round() / 1000.0;

        let (status, exit_code, stdout, stderr, timed_out) = match run {
            Ok(finished) => {
                let status = if finished.timed_out {
                    InvocationStatus::Timeout
                } else if finished
                    .exit_code
                    .is_some_and(|code| capability.guardrails.allowed_exit_codes.contains(&code))
                {
                    InvocationStatus::Ok
                } else {
                    InvocationStatus::Error
                };
                (
                    status,
                    finished.exit_code,
                    finished.stdout,
                    finished.stderr,
                    finished.timed_out,
                )
            }
            Err(e) => (
                InvocationStatus::Error,
                None,
                String::new(),
                format!("failed to start {}: {e}", argv[0]),
                false,
            ),
        };

        tracing::info!(
            capability = %capability.id,
            module = %module.id,
            status = ?status,
            exit_code = ?exit_code,
            duration,
            timed_out,
            "capability_finish"
        );

        InvocationOutcome {
            status,
            exit_code,
            stdout: tail_chars(&stdout, OUTPUT_TAIL),
            stderr: tail_chars(&stderr, OUTPUT_TAIL),
            command: argv.iter().map(|part| shell_quote(part)).collect::<Vec<_>>().join(" "),
            duration,
            timed_out,
            module: module.id.clone(),
        }
    }
}

struct Finished {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
    timed_out: bool,
}

async fn run_with_limit(
    argv: &[String],
    cwd: &Path,
    env: Vec<(String, OsString)>,
    limit: Duration,
) -> std::io::Result<Finished> {
    let mut command = Command::new(locate(&argv[0]));
    command
        .args(&argv[1..])
        .current_dir(cwd)
        .env_clear()
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn()?;
    let (stdout_sink, stderr_sink) = (Captured::default(), Captured::default());
    let stdout = tokio::spawn(drain(child.stdout.take(), stdout_sink.clone()));
    let stderr = tokio::spawn(drain(child.stderr.take(), stderr_sink.clone()));

    let (status, timed_out) = match tokio::time::timeout(limit, child.wait()).await {
        Ok(status) => (status?, false),
        Err(_) => (terminate(&mut child).await?, true),
    };

    Ok(Finished {
        exit_code: exit_code(status),
        stdout: collect(stdout, stdout_sink).await,
        stderr: collect(stderr, stderr_sink).await,
        timed_out,
    })
}

/// Kill the child's whole process group and reap the child.
async fn terminate(child: &mut Child) -> std::io::Result<ExitStatus> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;
        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
    let _ = child.start_kill();
    child.wait().await
}

type Captured = Arc<Mutex<Vec<u8>>>;

/// Read `reader` to the end, appending every chunk to `sink` as it arrives.
async fn drain<R: AsyncRead + Unpin>(reader: Option<R>, sink: Captured) {
    let Some(mut reader) = reader else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => {
                if let Ok(mut buffer) = sink.lock() {
                    buffer.extend_from_slice(&chunk[..read]);
                }
            }
        }
    }
}

/// Wait briefly for the pipe to close, then take whatever was captured.
///
/// A grandchild that inherited the pipe can keep it open past the child's
/// exit; the drain is abandoned after `DRAIN_GRACE` but its output is kept.
async fn collect(handle: JoinHandle<()>, sink: Captured) -> String {
    let abort = handle.abort_handle();
    if tokio::time::timeout(DRAIN_GRACE, handle).await.is_err() {
        abort.abort();
        tracing::debug!("Output pipe still open after exit, keeping partial output");
    }
    let bytes = match sink.lock() {
        Ok(buffer) => buffer.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    String::from_utf8_lossy(&bytes).into_owned()
}

fn exit_code(status: ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.code().or_else(|| status.signal().map(|signal| -signal))
    }
    #[cfg(not(unix))]
    {
        status.code()
    }
}

/// Resolve a bare program name against this process's `PATH`, since the
/// child's environment is cleared.
fn locate(program: &str) -> PathBuf {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    std::env::var_os("PATH")
        .and_then(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(program))
                .find(|path| path.is_file())
        })
        .unwrap_or_else(|| candidate.to_path_buf())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("exe" | "bat" | "cmd")
    )
}

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z]+").unwrap());
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// `dryRun` -> `DRY_RUN`, `output-dir` -> `OUTPUT_DIR`
pub fn upper_snake(name: &str) -> String {
    let underscored = NON_ALNUM.replace_all(name, "_");
    let split = CAMEL_BOUNDARY.replace_all(&underscored, "${1}_${2}");
    split.to_uppercase().trim_matches('_').to_string()
}

/// Last `limit` characters of `text`.
fn tail_chars(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        text.to_string()
    } else {
        text.chars().skip(count - limit).collect()
    }
}

/// Quote `part` for a POSIX shell when needed.
fn shell_quote(part: &str) -> String {
    let safe = !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        part.to_string()
    } else {
        format!("'{}'", part.replace('\'', r#"'"'"'"#))
    }
}
