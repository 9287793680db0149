//! Internal error type for invariant violations inside tether itself.

/// An internal error indicating a bug in tether, not a user input problem.
///
/// User-facing failures (bad bindings, missing sources, tool failures) have
/// their own error types and diagnostic codes.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
