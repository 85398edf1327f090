//! Health command implementation

use std::path::Path;

use cerebrum_health::{build_report, render_summary};
use colored::Colorize;

use crate::error::Result;

/// Print the workspace summary, followed by the JSON payload with `json`.
pub fn run_health(root: &Path, json: bool, autofix: bool) -> Result<()> {
    let report = build_report(root, autofix)?;

    for line in &report.autofix_log {
        eprintln!("{} {}", "autofix:".dimmed(), line);
    }
    print!("{}", render_summary(&report));

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    }
    Ok(())
}
