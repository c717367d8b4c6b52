//! Violation value objects produced by schema validation.

use serde::Serialize;

use crate::schema::ConstraintKind;

/// One failed schema constraint: which property, which constraint kind,
/// and the message to show.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Violation {
    /// The bean property the constraint is declared on.
    pub property: String,
    /// Human-readable message.
    pub message: String,
    /// The kind of constraint that failed.
    pub kind: ConstraintKind,
}

impl Violation {
    /// Create a new violation.
    pub fn new(property: impl Into<String>, message: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            kind,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}
