//! Minimal `.gitmodules` scanner

use std::collections::BTreeMap;

/// One `[submodule "<name>"]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodule {
    pub name: String,
    /// `key = value` lines of the section
    pub entries: BTreeMap<String, String>,
}

impl Submodule {
    /// Checkout path, falling back to the submodule name.
    pub fn path(&self) -> &str {
        self.entries
            .get("path")
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

/// Scan section headers and `key = value` lines.
///
/// Lines before the first header are ignored, as are headers without a
/// quoted name.
pub fn parse_gitmodules(text: &str) -> Vec<Submodule> {
    let mut modules: Vec<Submodule> = Vec::new();
    let mut in_section = false;
    for raw in text.lines() {
        let line = raw.trim();
        if line.starts_with("[submodule") {
            in_section = match line.split('"').nth(1) {
                Some(name) => {
                    modules.push(Submodule {
                        name: name.to_string(),
                        entries: BTreeMap::new(),
                    });
                    true
                }
                None => false,
            };
        } else if line.starts_with('[') {
            in_section = false;
        } else if let Some((key, value)) = line.split_once('=') {
            if in_section {
                if let Some(current) = modules.last_mut() {
                    current
                        .entries
                        .insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }
    }
    modules
}
