//! Watch-target digests and change detection

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cerebrum_fs::checksum;

use crate::state::{EvergreenState, Hashes};

/// Digest every watch target; a missing file maps to `None`.
pub fn compute_hashes(root: &Path, targets: &BTreeMap<String, PathBuf>) -> Hashes {
    targets
        .iter()
        .map(|(key, path)| {
            let resolved = cerebrum_meta::config::resolve(root, path);
            (key.clone(), checksum::file_checksum_if_exists(&resolved))
        })
        .collect()
}

/// Keys whose digest differs from the one recorded in `state`.
///
/// A key the state has never seen counts as changed.
pub fn changed_targets(hashes: &Hashes, state: &EvergreenState) -> Vec<String> {
    hashes
        .iter()
        .filter(|(key, digest)| state.hashes.get(*key) != Some(*digest))
        .map(|(key, _)| key.clone())
        .collect()
}
