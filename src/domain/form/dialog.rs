//! The compiled, immutable dialog shared by all sessions of one locale.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::Locale;

use super::errors::{FormError, ProcessingFault};
use super::field::{FieldDescriptor, FieldValue, ValidatorRef};
use super::input::InputVocabulary;
use super::record::OrderRecord;
use super::step::{ConfirmStep, Step};
use super::templates::{render_prompt, FormTemplates};
use super::validation::{validate_value, CustomValidator, ValidationResult};

/// Invoked once when a session reaches `Completed`.
///
/// Returned messages are forwarded to the user. A failure is contained:
/// the session still terminates as completed.
#[async_trait]
pub trait CompletionCallback: Send + Sync {
    async fn on_completion(&self, record: &OrderRecord) -> Result<Vec<String>, ProcessingFault>;
}

/// Ready-to-run dialog produced by `FormBuilder::build`.
pub struct CompiledDialog {
    pub(super) name: String,
    pub(super) locale: Option<Locale>,
    pub(super) fields: Vec<FieldDescriptor>,
    pub(super) confirms: Vec<ConfirmStep>,
    pub(super) steps: Vec<Step>,
    pub(super) validators: HashMap<String, CustomValidator>,
    pub(super) templates: FormTemplates,
    pub(super) vocabulary: InputVocabulary,
    pub(super) on_completion: Option<Arc<dyn CompletionCallback>>,
}

impl CompiledDialog {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn confirms(&self) -> &[ConfirmStep] {
        &self.confirms
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn templates(&self) -> &FormTemplates {
        &self.templates
    }

    pub fn vocabulary(&self) -> &InputVocabulary {
        &self.vocabulary
    }

    pub(crate) fn completion_callback(&self) -> Option<&Arc<dyn CompletionCallback>> {
        self.on_completion.as_ref()
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the step at an index.
    pub fn step(&self, index: usize) -> Result<&Step, FormError> {
        self.steps.get(index).ok_or(FormError::StepOutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    /// Returns the field at an index.
    pub fn field_at(&self, index: usize) -> Result<&FieldDescriptor, FormError> {
        self.fields
            .get(index)
            .ok_or_else(|| FormError::UnknownField(format!("#{}", index)))
    }

    /// Returns the confirm step at an index.
    pub fn confirm_at(&self, index: usize) -> Result<&ConfirmStep, FormError> {
        self.confirms.get(index).ok_or_else(|| FormError::Prompt {
            step: format!("#{}", index),
            reason: "no such confirm step".to_string(),
        })
    }

    /// Creates an empty record with one slot per field.
    pub fn new_record(&self) -> OrderRecord {
        OrderRecord::new(self.fields.iter().map(|f| f.name.clone()))
    }

    /// Validates a recognized value for the named field.
    pub fn validate(
        &self,
        record: &OrderRecord,
        field_name: &str,
        raw: Option<FieldValue>,
    ) -> Result<ValidationResult, FormError> {
        let field = self
            .field(field_name)
            .ok_or_else(|| FormError::UnknownField(field_name.to_string()))?;
        let custom = match &field.validator {
            ValidatorRef::Custom(name) => self.validators.get(name),
            _ => None,
        };
        validate_value(record, field, raw, &self.templates, custom)
    }

    /// Renders the prompt of the field at an index.
    pub fn field_prompt(&self, index: usize) -> Result<String, FormError> {
        Ok(render_prompt(self.field_at(index)?, &self.templates))
    }

    /// Name of the field or confirm step a step index points at.
    pub fn step_name(&self, index: usize) -> Result<&str, FormError> {
        match self.step(index)? {
            Step::Field { field, .. } => Ok(self.field_at(*field)?.name.as_str()),
            Step::Confirm { confirm } => Ok(self.confirm_at(*confirm)?.name.as_str()),
            Step::Message(_) => Ok(self.name.as_str()),
        }
    }

    /// Human description of a field or confirm step, looked up by name.
    pub fn describe(&self, name: &str) -> Option<&str> {
        self.field(name)
            .map(|f| f.description.as_str())
            .or_else(|| {
                self.confirms
                    .iter()
                    .find(|c| c.name == name)
                    .map(|c| c.description.as_str())
            })
    }
}

impl fmt::Debug for CompiledDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledDialog")
            .field("name", &self.name)
            .field("locale", &self.locale)
            .field("fields", &self.fields.len())
            .field("steps", &self.steps)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
