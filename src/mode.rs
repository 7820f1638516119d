//! Compatibility modes, as configured on a registry subject

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompatError;

/// Compatibility policy for a subject.
///
/// Transitive variants carry the guarantees of their non-transitive
/// counterpart. Only the direct old -> new pair is ever compared, so for
/// the rule table a transitive mode behaves exactly like its base mode.
///
/// Serializes to the wire name; deserializes through [`FromStr`], so
/// configuration accepts the same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum CompatibilityMode {
    None,
    Backward,
    BackwardTransitive,
    Forward,
    ForwardTransitive,
    Full,
    FullTransitive,
}

impl CompatibilityMode {
    pub const ALL: [CompatibilityMode; 7] = [
        CompatibilityMode::None,
        CompatibilityMode::Backward,
        CompatibilityMode::BackwardTransitive,
        CompatibilityMode::Forward,
        CompatibilityMode::ForwardTransitive,
        CompatibilityMode::Full,
        CompatibilityMode::FullTransitive,
    ];

    /// Registry wire name (e.g. `BACKWARD_TRANSITIVE`)
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityMode::None => "NONE",
            CompatibilityMode::Backward => "BACKWARD",
            CompatibilityMode::BackwardTransitive => "BACKWARD_TRANSITIVE",
            CompatibilityMode::Forward => "FORWARD",
            CompatibilityMode::ForwardTransitive => "FORWARD_TRANSITIVE",
            CompatibilityMode::Full => "FULL",
            CompatibilityMode::FullTransitive => "FULL_TRANSITIVE",
        }
    }

    /// New readers must handle data written with the old schema
    pub fn requires_backward(&self) -> bool {
        matches!(
            self,
            CompatibilityMode::Backward
                | CompatibilityMode::BackwardTransitive
                | CompatibilityMode::Full
                | CompatibilityMode::FullTransitive
        )
    }

    /// Old readers must handle data written with the new schema
    pub fn requires_forward(&self) -> bool {
        matches!(
            self,
            CompatibilityMode::Forward
                | CompatibilityMode::ForwardTransitive
                | CompatibilityMode::Full
                | CompatibilityMode::FullTransitive
        )
    }

    pub fn is_transitive(&self) -> bool {
        matches!(
            self,
            CompatibilityMode::BackwardTransitive
                | CompatibilityMode::ForwardTransitive
                | CompatibilityMode::FullTransitive
        )
    }

    /// The non-transitive mode with the same guarantees
    pub fn base(&self) -> CompatibilityMode {
        match self {
            CompatibilityMode::BackwardTransitive => CompatibilityMode::Backward,
            CompatibilityMode::ForwardTransitive => CompatibilityMode::Forward,
            CompatibilityMode::FullTransitive => CompatibilityMode::Full,
            other => *other,
        }
    }
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompatibilityMode {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| CompatError::InvalidMode(s.to_string()))
    }
}

impl TryFrom<String> for CompatibilityMode {
    type Error = CompatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
