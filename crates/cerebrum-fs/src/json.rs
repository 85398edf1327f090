//! Tolerant JSON state documents
//!
//! State files (hash caches, registries, probe results) are optional: a
//! missing, empty or unparseable file reads as the type's default rather
//! than an error. Writes are always pretty-printed, newline-terminated and
//! atomic.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Load a JSON document, falling back to `T::default()` when the file is
/// missing or does not parse.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &NormalizedPath) -> T {
    let content = match io::read_text(path) {
        Ok(content) => content,
        Err(_) => return T::default(),
    };
    if content.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Ignoring unparseable JSON document");
            T::default()
        }
    }
}

/// Load a JSON value, or `None` when the file is missing or unparseable.
pub fn load_value(path: &NormalizedPath) -> Option<serde_json::Value> {
    let content = io::read_text(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Serialize `value` as pretty JSON with a trailing newline and write it
/// atomically.
pub fn save_pretty<T: Serialize>(path: &NormalizedPath, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value).map_err(|e| Error::ConfigSerialize {
        path: path.to_native(),
        format: "JSON".into(),
        message: e.to_string(),
    })?;
    content.push('\n');
    io::write_text(path, &content)
}
