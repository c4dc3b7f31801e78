//! Steps of a compiled dialog.

use std::fmt;
use std::sync::Arc;

use super::errors::FormError;
use super::field::{FieldCondition, FieldValue};
use super::record::OrderRecord;

/// Computes confirm text from the record at the moment the step is entered.
pub type PromptFn = Arc<dyn Fn(&OrderRecord) -> Result<String, FormError> + Send + Sync>;

/// A yes/no step whose text depends on the record.
#[derive(Clone)]
pub struct ConfirmStep {
    pub name: String,
    /// Lowercase description used when the user cancels here.
    pub description: String,
    prompt: PromptFn,
}

impl ConfirmStep {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, prompt: F) -> Self
    where
        F: Fn(&OrderRecord) -> Result<String, FormError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: Arc::new(prompt),
        }
    }

    /// Computes the prompt for the current record.
    pub fn prompt(&self, record: &OrderRecord) -> Result<String, FormError> {
        (self.prompt)(record)
    }
}

impl fmt::Debug for ConfirmStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmStep")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// One entry of the compiled step sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Text shown once when the step is first reached.
    Message(String),
    /// Index into the dialog's fields.
    Field {
        field: usize,
        condition: Option<FieldCondition>,
    },
    /// Index into the dialog's confirm steps.
    Confirm { confirm: usize },
}

impl FieldCondition {
    /// Returns true if the guarded step should be presented.
    pub fn is_met(&self, record: &OrderRecord) -> bool {
        match (record.value(&self.field), &self.equals) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(FieldValue::Choice(v)), Some(expected)) => v == expected,
            (Some(FieldValue::Choices(vs)), Some(expected)) => vs.contains(expected),
            (Some(other), Some(expected)) => other.to_string() == *expected,
        }
    }
}
