//! Argument validation from JSON-Schema-like input declarations.
//!
//! Each declared property becomes a [`FieldDescriptor`]; arguments are
//! checked structurally at the boundary instead of through a generated type.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Value shape accepted by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Any,
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    /// Kind named by a property's `type`; unknown or union types accept
    /// anything.
    fn from_property(property: &Value) -> Self {
        match property.get("type").and_then(Value::as_str) {
            Some("string") => Self::String,
            Some("number") => Self::Number,
            Some("integer") => Self::Integer,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            _ => Self::Any,
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.as_f64().is_some_and(|n| n.fract() == 0.0),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Treatment of arguments that match no declared property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extras {
    Allow,
    Forbid,
}

/// One declared input property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub required: bool,
    pub kind: FieldKind,
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentIssue {
    NotAnObject,
    Missing(String),
    Unexpected(String),
    WrongKind { name: String, expected: FieldKind },
}

impl fmt::Display for ArgumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "arguments must be an object"),
            Self::Missing(name) => write!(f, "missing required argument '{name}'"),
            Self::Unexpected(name) => write!(f, "unexpected argument '{name}'"),
            Self::WrongKind { name, expected } => {
                write!(f, "argument '{name}' must be of type {expected}")
            }
        }
    }
}

/// All issues found in one set of arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ArgumentIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid arguments: {joined}")
    }
}

impl std::error::Error for ValidationError {}

/// Validator built from a capability's `inputs` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSchema {
    pub fields: Vec<FieldDescriptor>,
    pub extras: Extras,
    raw: Value,
}

impl ArgumentSchema {
    /// Translate a schema; a missing or non-object schema is fully open.
    pub fn from_json(schema: Option<&Value>) -> Self {
        let Some(object) = schema.and_then(Value::as_object) else {
            return Self {
                fields: Vec::new(),
                extras: Extras::Allow,
                raw: json!({"type": "object"}),
            };
        };

        let required: Vec<&str> = object
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields = object
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| FieldDescriptor {
                        name: name.clone(),
                        required: required.contains(&name.as_str()),
                        kind: FieldKind::from_property(property),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let extras = match object.get("additionalProperties") {
            Some(Value::Bool(false)) => Extras::Forbid,
            _ => Extras::Allow,
        };

        let mut raw = object.clone();
        raw.entry("type").or_insert_with(|| json!("object"));

        Self {
            fields,
            extras,
            raw: Value::Object(raw),
        }
    }

    /// The schema advertised to clients, with `type` defaulted to `object`.
    pub fn normalized(&self) -> &Value {
        &self.raw
    }

    fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Check `arguments` and return the accepted argument map.
    ///
    /// `null` counts as no arguments. Optional fields passed as `null` are
    /// dropped. Every problem is reported, not just the first.
    pub fn validate(&self, arguments: &Value) -> Result<Map<String, Value>, ValidationError> {
        let empty = Map::new();
        let given = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(ValidationError {
                    issues: vec![ArgumentIssue::NotAnObject],
                });
            }
        };

        let mut issues = Vec::new();
        for field in self.fields.iter().filter(|f| f.required) {
            if !given.contains_key(&field.name) {
                issues.push(ArgumentIssue::Missing(field.name.clone()));
            }
        }

        let mut accepted = Map::new();
        for (name, value) in given {
            match self.field(name) {
                Some(field) if value.is_null() && !field.required => {}
                Some(field) if !field.kind.accepts(value) => issues.push(ArgumentIssue::WrongKind {
                    name: name.clone(),
                    expected: field.kind,
                }),
                Some(_) => {
                    accepted.insert(name.clone(), value.clone());
                }
                None if self.extras == Extras::Forbid => {
                    issues.push(ArgumentIssue::Unexpected(name.clone()));
                }
                None => {
                    accepted.insert(name.clone(), value.clone());
                }
            }
        }

        if issues.is_empty() {
            Ok(accepted)
        } else {
            Err(ValidationError { issues })
        }
    }
}
