//! Decision report: ordered errors and warnings plus the final verdict

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::MetadataAttr;

/// What a finding is about: a field name or a metadata attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "name", rename_all = "snake_case")]
pub enum Subject {
    Field(String),
    Metadata(String),
}

impl Subject {
    pub fn field(name: impl Into<String>) -> Self {
        Subject::Field(name.into())
    }

    pub fn metadata(attr: MetadataAttr) -> Self {
        Subject::Metadata(attr.as_str().to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            Subject::Field(name) | Subject::Metadata(name) => name,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Field(name) => write!(f, "field '{}'", name),
            Subject::Metadata(attr) => write!(f, "{}", attr),
        }
    }
}

/// The rule that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    KindChanged,
    NameChanged,
    NamespaceChanged,
    FieldModified,
    FieldAddedWithoutDefault,
    FieldRemovedWithoutDefault,
    FieldAddedWithDefault,
    FieldRemovedWithDefault,
}

/// One error or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub subject: Subject,
    pub rule: Rule,
    pub message: String,
}

impl Finding {
    pub fn new(subject: Subject, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            subject,
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Outcome of one compatibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub compatible: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl Report {
    pub fn has_error_for(&self, name: &str) -> bool {
        self.errors.iter().any(|f| f.subject.name() == name)
    }

    pub fn has_warning_for(&self, name: &str) -> bool {
        self.warnings.iter().any(|f| f.subject.name() == name)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        let verdict = if self.compatible { "compatible" } else { "incompatible" };
        format!(
            "{} ({} errors, {} warnings)",
            verdict,
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Assemble a report; the verdict is compatible iff there are no errors
pub fn render(errors: Vec<Finding>, warnings: Vec<Finding>) -> Report {
    Report {
        compatible: errors.is_empty(),
        errors,
        warnings,
    }
}
