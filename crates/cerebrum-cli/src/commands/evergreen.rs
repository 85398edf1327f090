//! Evergreen command implementation

use std::path::Path;

use cerebrum_evergreen::{Evergreen, RunOptions};
use cerebrum_meta::WorkspaceConfig;

use crate::error::Result;

/// Run the validator and print its JSON payloads.
///
/// Returns the process exit code: the validation command's when it ran,
/// otherwise 0.
pub fn run_evergreen(root: &Path, options: RunOptions) -> Result<i32> {
    let config = WorkspaceConfig::load(root);
    let evergreen = Evergreen::new(root, config.evergreen);

    let (outcome, hint) = evergreen.run(&options)?;
    if let Some(hint) = hint {
        println!("{}", serde_json::to_string(&hint)?);
    }
    println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);

    Ok(outcome.exit_code())
}
