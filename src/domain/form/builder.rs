//! Dialog compiler.
//!
//! `FormBuilder` collects field declarations and an ordered plan of
//! message, field and confirm steps, then compiles them into an immutable
//! `CompiledDialog`. The static order declaration and the schema front-end
//! both end up here, so their dialogs are interchangeable at runtime.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::foundation::Locale;

use super::dialog::{CompiledDialog, CompletionCallback};
use super::errors::{FormError, SchemaError};
use super::field::{FieldCondition, FieldDescriptor, FieldValue, ValidatorRef};
use super::input::InputVocabulary;
use super::record::OrderRecord;
use super::step::{ConfirmStep, Step};
use super::templates::FormTemplates;
use super::validation::{CustomValidator, ValidationResult};

/// One entry of a dialog plan, before field names are resolved.
#[derive(Debug, Clone)]
pub enum PlannedStep {
    Message(String),
    Field {
        name: String,
        condition: Option<FieldCondition>,
    },
    Confirm(ConfirmStep),
    /// Every declared field not placed explicitly, in declaration order.
    RemainingFields,
}

/// Builder for compiled dialogs.
///
/// ```ignore
/// let dialog = FormBuilder::new("Order")
///     .declare(size_field)
///     .declare(name_field)
///     .message("Welcome!")
///     .field("Size")
///     .confirm(price_step)
///     .add_remaining_fields()
///     .build()?;
/// ```
pub struct FormBuilder {
    name: String,
    locale: Option<Locale>,
    declared: Vec<FieldDescriptor>,
    plan: Vec<PlannedStep>,
    validators: HashMap<String, CustomValidator>,
    templates: FormTemplates,
    vocabulary: InputVocabulary,
    on_completion: Option<Arc<dyn CompletionCallback>>,
}

impl FormBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locale: None,
            declared: Vec::new(),
            plan: Vec::new(),
            validators: HashMap::new(),
            templates: FormTemplates::default(),
            vocabulary: InputVocabulary::default(),
            on_completion: None,
        }
    }

    /// Adds a field to the registry without placing it.
    pub fn declare(mut self, field: FieldDescriptor) -> Self {
        self.declared.push(field);
        self
    }

    /// Adds a message step.
    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.plan.push(PlannedStep::Message(text.into()));
        self
    }

    /// Places a declared field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.plan.push(PlannedStep::Field {
            name: name.into(),
            condition: None,
        });
        self
    }

    /// Places a declared field that is only asked when `condition` holds.
    pub fn field_when(mut self, name: impl Into<String>, condition: FieldCondition) -> Self {
        self.plan.push(PlannedStep::Field {
            name: name.into(),
            condition: Some(condition),
        });
        self
    }

    /// Adds a confirm step.
    pub fn confirm(mut self, step: ConfirmStep) -> Self {
        self.plan.push(PlannedStep::Confirm(step));
        self
    }

    /// Places every field not placed explicitly.
    pub fn add_remaining_fields(mut self) -> Self {
        self.plan.push(PlannedStep::RemainingFields);
        self
    }

    /// Registers a custom validator referenced by `ValidatorRef::Custom`.
    pub fn validator<F>(mut self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&OrderRecord, &FieldDescriptor, Option<FieldValue>) -> Result<ValidationResult, FormError>
            + Send
            + Sync
            + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn templates(mut self, templates: FormTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn vocabulary(mut self, vocabulary: InputVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn on_completion(mut self, callback: Arc<dyn CompletionCallback>) -> Self {
        self.on_completion = Some(callback);
        self
    }

    /// Returns the fields declared so far.
    pub fn declared(&self) -> &[FieldDescriptor] {
        &self.declared
    }

    /// Compiles the dialog.
    pub fn build(self) -> Result<CompiledDialog, SchemaError> {
        if self.declared.is_empty() {
            return Err(SchemaError::Empty(self.name));
        }
        self.check_declarations()?;

        let index_of = |name: &str| -> Result<usize, SchemaError> {
            self.declared
                .iter()
                .position(|f| f.name == name)
                .ok_or_else(|| SchemaError::UnknownReference {
                    kind: "field",
                    name: name.to_string(),
                })
        };

        let explicit: HashSet<&str> = self
            .plan
            .iter()
            .filter_map(|p| match p {
                PlannedStep::Field { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        let has_field_steps = self
            .plan
            .iter()
            .any(|p| matches!(p, PlannedStep::Field { .. } | PlannedStep::RemainingFields));

        let mut steps = Vec::new();
        let mut confirms = Vec::new();
        let mut placed: HashSet<usize> = HashSet::new();

        for planned in &self.plan {
            match planned {
                PlannedStep::Message(text) => steps.push(Step::Message(text.clone())),
                PlannedStep::Field { name, condition } => {
                    let field = index_of(name)?;
                    if !placed.insert(field) {
                        return Err(SchemaError::DuplicateField(name.clone()));
                    }
                    if let Some(condition) = condition {
                        index_of(&condition.field)?;
                    }
                    steps.push(Step::Field {
                        field,
                        condition: condition.clone(),
                    });
                }
                PlannedStep::Confirm(step) => {
                    steps.push(Step::Confirm {
                        confirm: confirms.len(),
                    });
                    confirms.push(step.clone());
                }
                PlannedStep::RemainingFields => {
                    for (field, descriptor) in self.declared.iter().enumerate() {
                        if !explicit.contains(descriptor.name.as_str()) && placed.insert(field) {
                            steps.push(Step::Field {
                                field,
                                condition: None,
                            });
                        }
                    }
                }
            }
        }

        if !has_field_steps {
            for field in 0..self.declared.len() {
                steps.push(Step::Field {
                    field,
                    condition: None,
                });
            }
        }

        tracing::debug!(
            dialog = %self.name,
            locale = ?self.locale,
            fields = self.declared.len(),
            steps = steps.len(),
            "Compiled dialog"
        );

        Ok(CompiledDialog {
            name: self.name,
            locale: self.locale,
            fields: self.declared,
            confirms,
            steps,
            validators: self.validators,
            templates: self.templates,
            vocabulary: self.vocabulary,
            on_completion: self.on_completion,
        })
    }

    fn check_declarations(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.declared {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            field.check()?;
            if let ValidatorRef::Custom(name) = &field.validator {
                if !self.validators.contains_key(name) {
                    return Err(SchemaError::UnknownReference {
                        kind: "validator",
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Compiles a dialog from descriptors and an ordered plan.
pub fn compile(
    name: impl Into<String>,
    fields: Vec<FieldDescriptor>,
    plan: Vec<PlannedStep>,
    on_completion: Option<Arc<dyn CompletionCallback>>,
) -> Result<CompiledDialog, SchemaError> {
    let mut builder = FormBuilder::new(name);
    builder.declared = fields;
    builder.plan = plan;
    builder.on_completion = on_completion;
    builder.build()
}
