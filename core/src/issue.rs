//! Structured validation issues.
//!
//! An [`Issue`] describes one problem with one location in the input. Issues
//! are serialized as JSON and sent back to clients, so their shape is part of
//! the HTTP contract:
//!
//! ```json
//! { "code": "invalid_type", "path": ["id"], "message": "123 is not of type \"string\"" }
//! ```

use jsonschema::{ValidationError, error::ValidationErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Machine-readable category of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// The value has the wrong JSON type.
    InvalidType,
    /// A required field is absent.
    MissingField,
    /// The value has the right type but violates a constraint.
    InvalidValue,
    /// The request body could not be read as JSON.
    InvalidBody,
    /// Raised by a custom extraction function.
    Custom,
}

/// One step in the path to the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array index.
    Index(usize),
    /// Object key.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue category.
    pub code: IssueCode,
    /// Location of the offending value; empty for the root.
    pub path: Vec<PathSegment>,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Create an issue at the root of the input.
    #[must_use]
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Create a [`IssueCode::Custom`] issue, for custom extraction functions.
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueCode::Custom, message)
    }

    /// Append a segment to the issue path.
    #[must_use]
    pub fn at(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.push(segment.into());
        self
    }

    /// Whether the issue path names the given top-level field.
    #[must_use]
    pub fn names_field(&self, field: &str) -> bool {
        matches!(self.path.first(), Some(PathSegment::Key(key)) if key == field)
    }

    /// Build an issue from a JSON Schema violation.
    ///
    /// The path comes from the violation's instance location. For a missing
    /// required property the property name is appended, so the issue points
    /// at the field the client forgot rather than at its parent object.
    #[must_use]
    pub fn from_validation_error(error: &ValidationError<'_>) -> Self {
        let mut path = parse_json_pointer(&error.instance_path.to_string());
        let code = match &error.kind {
            ValidationErrorKind::Type { .. } => IssueCode::InvalidType,
            ValidationErrorKind::Required { property } => {
                if let Value::String(name) = property {
                    path.push(PathSegment::Key(name.clone()));
                }
                IssueCode::MissingField
            }
            _ => IssueCode::InvalidValue,
        };

        Self {
            code,
            path,
            message: error.to_string(),
        }
    }

    /// Build an issue from a `serde_json` deserialization failure.
    ///
    /// `serde_json` does not report the failing path, so only missing fields
    /// (whose name appears in the message) get a non-empty path.
    #[must_use]
    pub fn from_serde_error(error: &serde_json::Error) -> Self {
        let message = error.to_string();
        if let Some(field) = backticked(&message, "missing field `") {
            return Self::new(IssueCode::MissingField, message.clone()).at(field);
        }
        let code = if message.starts_with("invalid type") {
            IssueCode::InvalidType
        } else {
            IssueCode::InvalidValue
        };
        Self::new(code, message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return f.write_str(&self.message);
        }
        let path = self
            .path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{path}: {}", self.message)
    }
}

/// Non-empty, ordered list of issues.
///
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Issues(Vec<Issue>);

impl Issues {
    /// A list holding exactly one issue.
    #[must_use]
    pub fn single(issue: Issue) -> Self {
        Self(vec![issue])
    }

    /// Wrap a list of issues, returning `None` when it is empty.
    #[must_use]
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self(issues))
        }
    }

    /// Number of issues; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the issues.
    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Issue> {
        self.0
    }
}

impl From<Issue> for Issues {
    fn from(issue: Issue) -> Self {
        Self::single(issue)
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Split an RFC 6901 JSON pointer into path segments.
fn parse_json_pointer(pointer: &str) -> Vec<PathSegment> {
    pointer
        .split('/')
        .skip(1)
        .map(|token| {
            let token = token.replace("~1", "/").replace("~0", "~");
            token
                .parse::<usize>()
                .map_or(PathSegment::Key(token), PathSegment::Index)
        })
        .collect()
}

fn backticked<'m>(message: &'m str, prefix: &str) -> Option<&'m str> {
    let rest = message.strip_prefix(prefix)?;
    rest.split('`').next()
}
