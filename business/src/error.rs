//! Field-level validation failures shown next to the offending input.

/// A user input that cannot be turned into a payload.
///
/// Raised before any encoding request is issued, so a validation failure never reaches
/// the encoding gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    field: &'static str,
    message: &'static str,
}

impl ValidationError {
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }

    /// Name of the input the message belongs to.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}
