use thiserror::Error;

/// Validation failure signal.
///
/// Carried by per-field checks and cross-field validators. The display
/// representation is the message itself so it can be attached to a field
/// or rendered in a form-level error list without further formatting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidValue {
    /// Human-readable description of the failure.
    pub message: String,
}

impl InvalidValue {
    /// Create a new failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for InvalidValue {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for InvalidValue {
    fn from(message: String) -> Self {
        Self { message }
    }
}
