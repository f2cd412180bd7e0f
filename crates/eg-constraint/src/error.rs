// error.rs — Error types for the constraint subsystem.

use thiserror::Error;

/// Errors that can occur when managing the constraint registry.
///
/// These are configuration errors: fatal at registration time, never
/// produced on the validation path itself.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// A constraint with this id is already registered.
    #[error("constraint id '{id}' is already registered")]
    DuplicateConstraint { id: String },
}

/// A constraint predicate failed to evaluate.
///
/// This is not propagated as a crash — the validator treats it as a
/// fail-closed violation of the constraint that raised it.
#[derive(Debug, Clone, Error)]
#[error("constraint evaluation error: {0}")]
pub struct ConstraintEvalError(pub String);

impl ConstraintEvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
