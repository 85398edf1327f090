//! Python alignment probe.
//!
//! When a project override pins python below the canonical toolchain
//! version (and explicitly allows it), try installing the project's
//! requirements into a throwaway environment built with the canonical
//! interpreter. A success means the override can be dropped.
//!
//! Results are cached per canonical/override pair for `retention_hours`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use cerebrum_fs::{NormalizedPath, io, json};
use cerebrum_meta::{ProbeConfig, config::resolve};
use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::state::{EvergreenState, ProbeStatus, ProbeStep, ProbeSummary};
use crate::version;

/// What the probe decided to do for the current version pair
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeDecision {
    /// No override applies, nothing was probed
    NotApplicable,
    /// A fresh enough result for the same pair was reused
    Cached(ProbeSummary),
    /// The probe ran and produced a new result
    Ran(ProbeSummary),
}

impl ProbeDecision {
    /// The summary to record, if any.
    pub fn summary(&self) -> Option<&ProbeSummary> {
        match self {
            Self::NotApplicable => None,
            Self::Cached(summary) | Self::Ran(summary) => Some(summary),
        }
    }
}

/// Canonical and override versions read from the manifests
#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionPair {
    canonical: String,
    override_version: String,
    allow_lower: bool,
}

/// Probe runner bound to a workspace root and project directory
#[derive(Debug, Clone)]
pub struct PythonProbe {
    root: PathBuf,
    project_dir: PathBuf,
    config: ProbeConfig,
}

impl PythonProbe {
    pub fn new(root: impl Into<PathBuf>, project_dir: impl Into<PathBuf>, config: ProbeConfig) -> Self {
        Self {
            root: root.into(),
            project_dir: project_dir.into(),
            config,
        }
    }

    /// Decide whether to probe and run it when needed.
    pub fn evaluate(&self, state: &EvergreenState) -> ProbeDecision {
        let Some(pair) = self.version_pair() else {
            return ProbeDecision::NotApplicable;
        };
        if !version::is_newer(&pair.canonical, &pair.override_version) || !pair.allow_lower {
            return ProbeDecision::NotApplicable;
        }

        if let Some(existing) = &state.python_probe {
            if existing.canonical == pair.canonical
                && existing.override_version == pair.override_version
                && self.is_fresh(&existing.timestamp)
            {
                tracing::debug!(canonical = %pair.canonical, "Reusing cached python probe");
                return ProbeDecision::Cached(existing.clone());
            }
        }

        let (status, message, steps) = self.run_steps(&pair.canonical);
        tracing::info!(
            canonical = %pair.canonical,
            override_version = %pair.override_version,
            status = ?status,
            "Python probe finished"
        );
        ProbeDecision::Ran(ProbeSummary {
            status,
            message,
            log_path: self.relative(&self.log_file()),
            steps,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            canonical: pair.canonical,
            override_version: pair.override_version,
            allow_lower: pair.allow_lower,
        })
    }

    fn version_pair(&self) -> Option<VersionPair> {
        let manifest = json::load_value(&self.path(&self.config.toolchain_manifest))?;
        let canonical = manifest
            .pointer("/toolchains/python/version")?
            .as_str()
            .filter(|v| !v.is_empty())?
            .to_string();

        let overrides = json::load_value(&self.path(&self.config.override_file))?;
        let entry = overrides.pointer("/overrides/python")?;
        let override_version = entry
            .get("version")?
            .as_str()
            .filter(|v| !v.is_empty())?
            .to_string();
        let allow_lower = entry
            .get("allow_lower")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Some(VersionPair {
            canonical,
            override_version,
            allow_lower,
        })
    }

    fn is_fresh(&self, timestamp: &str) -> bool {
        let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
            return false;
        };
        Utc::now().signed_duration_since(parsed.with_timezone(&Utc))
            < Duration::hours(self.config.retention_hours)
    }

    fn run_steps(&self, python_version: &str) -> (ProbeStatus, String, Vec<ProbeStep>) {
        let mut session = ProbeSession {
            log: self.log_file(),
            cwd: self.project_dir.clone(),
            steps: Vec::new(),
        };
        session.start(python_version);

        let venv = VenvGuard::new(self.project_dir.join(&self.config.venv_dir));
        let installer = self.config.installer.as_str();

        if !installer_available(installer) {
            return (
                ProbeStatus::Skipped,
                format!("{installer} executable not found; install {installer} to enable python probe"),
                session.steps,
            );
        }

        let venv_arg = venv.path.to_string_lossy().to_string();
        if !session.run("install-interpreter", installer, &["python", "install", python_version]) {
            return (
                ProbeStatus::Failed,
                format!("{installer} could not install requested python"),
                session.steps,
            );
        }
        if !session.run(
            "create-venv",
            installer,
            &["venv", "--python", python_version, &venv_arg],
        ) {
            return (
                ProbeStatus::Failed,
                "failed to create probe virtualenv".to_string(),
                session.steps,
            );
        }

        let requirements = self.project_dir.join(&self.config.requirements);
        if !requirements.is_file() {
            return (
                ProbeStatus::Skipped,
                format!("Missing requirements file at {}", requirements.display()),
                session.steps,
            );
        }

        let python = venv.python();
        let python = python.to_string_lossy();
        if !session.run(
            "pip-upgrade",
            &python,
            &["-m", "pip", "install", "--upgrade", "pip"],
        ) {
            return (
                ProbeStatus::Failed,
                "pip upgrade failed inside probe venv".to_string(),
                session.steps,
            );
        }

        let requirements_arg = requirements.to_string_lossy();
        if session.run(
            "pip-install",
            &python,
            &["-m", "pip", "install", "-r", &requirements_arg],
        ) {
            (
                ProbeStatus::Success,
                "Installed requirements with canonical python".to_string(),
                session.steps,
            )
        } else {
            (
                ProbeStatus::Failed,
                "pip install failed".to_string(),
                session.steps,
            )
        }
    }

    fn log_file(&self) -> PathBuf {
        self.path(&self.config.log_file).to_native()
    }

    fn path(&self, configured: &Path) -> NormalizedPath {
        NormalizedPath::new(resolve(&self.root, configured))
    }

    fn relative(&self, path: &Path) -> String {
        NormalizedPath::new(path).relative_to(&self.root)
    }
}

/// Removes the ephemeral environment on every exit path.
struct VenvGuard {
    path: PathBuf,
}

impl VenvGuard {
    fn new(path: PathBuf) -> Self {
        let _ = std::fs::remove_dir_all(&path);
        Self { path }
    }

    fn python(&self) -> PathBuf {
        if cfg!(windows) {
            self.path.join("Scripts").join("python.exe")
        } else {
            self.path.join("bin").join("python")
        }
    }
}

impl Drop for VenvGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Sequential step runner that mirrors every command into the probe log.
struct ProbeSession {
    log: PathBuf,
    cwd: PathBuf,
    steps: Vec<ProbeStep>,
}

impl ProbeSession {
    fn start(&self, python_version: &str) {
        let header = format!(
            "[python-probe] {} Trying Python {python_version}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
        );
        if let Err(e) = io::write_text(&NormalizedPath::new(&self.log), &header) {
            tracing::warn!(error = %e, "Cannot write python probe log");
        }
    }

    fn run(&mut self, step: &str, program: &str, args: &[&str]) -> bool {
        let mut command = Command::new(program);
        command.args(args).current_dir(&self.cwd);
        if std::env::var_os("UV_PYTHON_DOWNLOADS").is_none() {
            command.env("UV_PYTHON_DOWNLOADS", "cache");
        }

        let joined = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
        let (code, transcript) = match command.output() {
            Ok(output) => (exit_code(&output), transcript(&output)),
            Err(e) => (-1, format!("{e}\n")),
        };
        self.steps.push(ProbeStep {
            step: step.to_string(),
            code,
        });
        let entry = format!("\n$ {joined}\n{transcript}");
        if let Err(e) = io::append_text(&NormalizedPath::new(&self.log), &entry) {
            tracing::warn!(error = %e, "Cannot append to python probe log");
        }
        tracing::debug!(step, code, "Probe step finished");
        code == 0
    }
}

fn installer_available(installer: &str) -> bool {
    Command::new(installer)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn transcript(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
