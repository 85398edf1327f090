//! Capability lists supplied to the scaffold

use std::path::Path;

use cerebrum_fs::{NormalizedPath, io};
use serde_json::Value;

use crate::profile::AgentCapability;
use crate::{Error, Result};

/// Read a capabilities file.
///
/// The document is either a bare list or an object with a `capabilities`
/// list.
pub fn load_capabilities_file(path: &Path) -> Result<Vec<AgentCapability>> {
    let content = io::read_text(&NormalizedPath::new(path))?;
    let document: Value =
        serde_json::from_str(&content).map_err(|e| Error::CapabilitiesParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("capabilities") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(Error::InvalidCapabilitiesShape {
                    path: path.to_path_buf(),
                });
            }
        },
        _ => {
            return Err(Error::InvalidCapabilitiesShape {
                path: path.to_path_buf(),
            });
        }
    };
    parse_capabilities(entries)
}

/// Convert raw entries; `name` defaults to the capability id.
pub fn parse_capabilities(entries: Vec<Value>) -> Result<Vec<AgentCapability>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            if let Value::Object(object) = &mut entry {
                if !object.contains_key("name") {
                    if let Some(id) = object.get("id").cloned() {
                        object.insert("name".to_string(), id);
                    }
                }
            }
            serde_json::from_value(entry).map_err(|e| Error::InvalidCapability {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}
