//! Evergreen orchestration: plan, probe, validate, record

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use cerebrum_fs::{NormalizedPath, io, json};
use cerebrum_meta::{EvergreenConfig, config::resolve};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::hashing::{changed_targets, compute_hashes};
use crate::probe::{ProbeDecision, PythonProbe};
use crate::state::{EvergreenState, Hashes, ProbeStatus, ProbeSummary, RunStatus, RunSummary};
use crate::{Error, Result};

/// Flags accepted by an evergreen invocation
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Limit validation to these templates
    pub templates: Vec<String>,
    /// Pass `--force-rebuild` to the validation command
    pub force_rebuild: bool,
    /// Run even when nothing changed
    pub force: bool,
    /// Report only; never run anything or touch state
    pub check_only: bool,
}

/// Whether a run is needed and why
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub needs_run: bool,
    pub changed_targets: Vec<String>,
    pub hashes: Hashes,
    /// Workspace-relative state path, `null` until state exists
    pub state_path: Option<String>,
    /// `needs-run`, `clean` or `skipped`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_probe: Option<ProbeSummary>,
}

/// Result of [`Evergreen::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum EvergreenOutcome {
    /// `check_only` was requested
    Checked(CheckReport),
    /// Nothing changed and the run was not forced
    Skipped(CheckReport),
    /// The validation command ran
    Ran(RunSummary),
}

impl EvergreenOutcome {
    /// Process exit code: the validation command's, or 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ran(summary) => summary.exit_code,
            Self::Checked(_) | Self::Skipped(_) => 0,
        }
    }

    /// JSON payload printed for this outcome.
    pub fn to_json(&self) -> Value {
        let value = match self {
            Self::Checked(report) | Self::Skipped(report) => serde_json::to_value(report),
            Self::Ran(summary) => serde_json::to_value(summary),
        };
        value.unwrap_or(Value::Null)
    }
}

/// Change-driven validator bound to a workspace root
#[derive(Debug, Clone)]
pub struct Evergreen {
    root: PathBuf,
    config: EvergreenConfig,
}

impl Evergreen {
    pub fn new(root: impl Into<PathBuf>, config: EvergreenConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    fn project_dir(&self) -> PathBuf {
        resolve(&self.root, &self.config.project_dir)
    }

    fn state_path(&self) -> NormalizedPath {
        NormalizedPath::new(resolve(&self.root, &self.config.state_file))
    }

    fn artifact_dir(&self) -> NormalizedPath {
        NormalizedPath::new(resolve(&self.root, &self.config.artifact_dir))
    }

    fn relative(&self, path: &NormalizedPath) -> String {
        path.relative_to(&self.root)
    }

    /// The python alignment probe for this project.
    pub fn probe(&self) -> PythonProbe {
        PythonProbe::new(&self.root, self.project_dir(), self.config.probe.clone())
    }

    /// Fail unless the project directory and every watch target exist.
    pub fn ensure_prereqs(&self) -> Result<()> {
        let project = self.project_dir();
        if !project.is_dir() {
            return Err(Error::ProjectMissing { path: project });
        }
        for (key, target) in &self.config.watch {
            let path = resolve(&self.root, target);
            if !path.exists() {
                return Err(Error::WatchTargetMissing {
                    key: key.clone(),
                    path,
                });
            }
        }
        Ok(())
    }

    /// Compare current digests with `state`.
    pub fn plan(&self, state: &EvergreenState, options: &RunOptions) -> CheckReport {
        let hashes = compute_hashes(&self.root, &self.config.watch);
        let changed = changed_targets(&hashes, state);
        let needs_run = !changed.is_empty() || options.force || state.last_run.is_none();
        let state_path = self.state_path();

        CheckReport {
            needs_run,
            changed_targets: changed,
            hashes,
            state_path: state_path.exists().then(|| self.relative(&state_path)),
            status: if needs_run { "needs-run" } else { "clean" }.to_string(),
            message: None,
            python_probe: state.python_probe.clone(),
        }
    }

    /// Run the full evergreen flow.
    ///
    /// Returns the hint payload printed when a fresh probe succeeded
    /// alongside the outcome.
    pub fn run(&self, options: &RunOptions) -> Result<(EvergreenOutcome, Option<Value>)> {
        self.ensure_prereqs()?;
        let state_path = self.state_path();
        let mut state = EvergreenState::load(&state_path);

        if options.check_only {
            let report = self.plan(&state, options);
            tracing::info!(needs_run = report.needs_run, "Evergreen check only");
            return Ok((EvergreenOutcome::Checked(report), None));
        }

        let mut hint = None;
        if let ProbeDecision::Ran(summary) = self.probe().evaluate(&state) {
            if summary.status == ProbeStatus::Success {
                hint = Some(json!({
                    "pythonProbe": summary,
                    "message": "Canonical Python succeeded; remove the override to align versions.",
                }));
            }
            state.python_probe = Some(summary);
            state.save(&state_path)?;
        }

        let mut report = self.plan(&state, options);
        if !report.needs_run && !options.force {
            report.status = "skipped".to_string();
            report.message =
                Some("No watched changes detected; use --force to run anyway.".to_string());
            tracing::info!("No watched changes, skipping validation");
            return Ok((EvergreenOutcome::Skipped(report), hint));
        }

        let summary = self.validate(options, report.hashes, report.changed_targets, &state)?;
        let mut next = state;
        if summary.status == RunStatus::Success {
            next.hashes = summary.hashes.clone();
        }
        next.last_run = Some(summary.clone());
        next.save(&state_path)?;

        Ok((EvergreenOutcome::Ran(summary), hint))
    }

    /// Build the validation command line.
    pub fn command(&self, options: &RunOptions) -> Vec<String> {
        let mut command = self.config.validate_command.clone();
        for template in &options.templates {
            command.push("--template".to_string());
            command.push(template.clone());
        }
        if options.force_rebuild {
            command.push("--force-rebuild".to_string());
        }
        command
    }

    fn validate(
        &self,
        options: &RunOptions,
        hashes: Hashes,
        changed: Vec<String>,
        state: &EvergreenState,
    ) -> Result<RunSummary> {
        let command = self.command(options);
        let (program, args) = command.split_first().ok_or(Error::EmptyCommand)?;
        let project = self.project_dir();

        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let artifacts = self.artifact_dir();
        let run_id = unique_run_id(&artifacts, &format!("{}-{}", self.config.run_prefix, timestamp));
        let log_path = artifacts.join(&format!("{run_id}.log"));
        let json_path = artifacts.join(&format!("{run_id}.json"));

        tracing::info!(run_id = %run_id, command = %command.join(" "), "Running validation");
        let start = Instant::now();
        let output = Command::new(program_path(&project, program))
            .args(args)
            .current_dir(&project)
            .output()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;
        let duration = start.elapsed().as_secs_f64();
        let exit_code = output.status.code().unwrap_or(-1);

        let log = format!(
            "{}\n--- stderr ---\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        io::write_text(&log_path, &log)?;

        let summary = RunSummary {
            run_id,
            timestamp,
            command: command.join(" "),
            templates: if options.templates.is_empty() {
                vec!["*".to_string()]
            } else {
                options.templates.clone()
            },
            force_rebuild: options.force_rebuild,
            duration_seconds: (duration * 100.0).round() / 100.0,
            exit_code,
            hashes,
            changed_targets: changed,
            log_path: self.relative(&log_path),
            artifact_path: self.relative(&json_path),
            status: if exit_code == 0 {
                RunStatus::Success
            } else {
                RunStatus::Failed
            },
            python_probe: state.python_probe.clone(),
        };
        json::save_pretty(&json_path, &summary)?;
        tracing::info!(exit_code, duration = summary.duration_seconds, "Validation finished");
        Ok(summary)
    }
}

/// `base`, or `base-N` with the smallest N >= 2 whose artifacts do not exist
/// yet, so runs within the same second keep separate records.
fn unique_run_id(artifacts: &NormalizedPath, base: &str) -> String {
    let taken = |id: &str| {
        artifacts.join(&format!("{id}.json")).exists() || artifacts.join(&format!("{id}.log")).exists()
    };
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|id| !taken(id))
        .unwrap_or_else(|| base.to_string())
}

/// Relative programs with a directory component resolve against the project.
fn program_path(project: &Path, program: &str) -> PathBuf {
    let candidate = Path::new(program);
    if candidate.is_relative() && candidate.components().count() > 1 {
        project.join(candidate)
    } else {
        candidate.to_path_buf()
    }
}
