//! Error types for the dialog engine.
//!
//! Validation rejections are not errors: they are `ValidationResult`
//! values that lead to a re-prompt. Everything in here is either a failed
//! compilation (`SchemaError`), a contained completion failure
//! (`ProcessingFault`) or an internal fault that sends a session to
//! `DialogState::Faulted` (`FormError`).

use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// Unexpected failure while running a turn.
///
/// The message is logged, never shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Step {index} is out of range for a dialog of {len} steps")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Value of kind '{actual}' cannot fill field '{field}'")]
    ValueKindMismatch { field: String, actual: &'static str },

    #[error("Slot '{0}' has no pending value to confirm")]
    SlotNotPending(String),

    #[error("Prompt for step '{step}' failed: {reason}")]
    Prompt { step: String, reason: String },

    #[error("Validator for field '{field}' failed: {reason}")]
    Validator { field: String, reason: String },

    #[error("Invalid dialog transition: {0}")]
    Transition(#[from] ValidationError),
}

/// Compilation failure for one dialog.
///
/// Returned by both the static builder and the schema front-end. A failed
/// compilation never reaches the locale cache.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Schema document could not be parsed: {0}")]
    Parse(String),

    #[error("Field '{field}' has unknown type '{field_type}'")]
    UnknownFieldType { field: String, field_type: String },

    #[error("Field '{field}' has a malformed constraint: {reason}")]
    MalformedConstraint { field: String, reason: String },

    #[error("Field '{0}' is declared or placed more than once")]
    DuplicateField(String),

    #[error("Step references unknown {kind} '{name}'")]
    UnknownReference { kind: &'static str, name: String },

    #[error("Dialog '{0}' has no steps")]
    Empty(String),

    #[error("Template '{template_id}' is unavailable: {reason}")]
    MissingTemplate { template_id: String, reason: String },

    #[error("Schema source failed: {0}")]
    Source(String),
}

impl SchemaError {
    /// Creates a malformed constraint error for a field.
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedConstraint {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Completion callback failure.
///
/// Contained by the runtime: the session still terminates as `Completed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Order processing failed: {0}")]
pub struct ProcessingFault(pub String);
