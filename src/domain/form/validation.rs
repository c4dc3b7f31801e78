//! Validation layer.
//!
//! Validators read the current record but never mutate it. An accepted
//! value may differ from the recognized one: the complement validator turns
//! a selection containing the "all" sentinel into every other option.

use std::sync::Arc;

use super::errors::FormError;
use super::field::{FieldDescriptor, FieldKind, FieldValue, ValidatorRef};
use super::record::OrderRecord;
use super::templates::{render, FormTemplates};

/// Outcome of validating one recognized value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Value to store; `None` leaves the slot confirmed but empty.
    Accepted(Option<FieldValue>),
    /// Reason shown before re-asking the same field.
    Rejected { reason: String },
}

impl ValidationResult {
    /// Creates a rejection.
    pub fn rejected(reason: impl Into<String>) -> Self {
        ValidationResult::Rejected {
            reason: reason.into(),
        }
    }

    /// Returns true if the value was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted(_))
    }
}

/// Validator registered on a builder and referenced by name.
///
/// Runs after the standard checks, on the already accepted value.
pub type CustomValidator = Arc<
    dyn Fn(&OrderRecord, &FieldDescriptor, Option<FieldValue>) -> Result<ValidationResult, FormError>
        + Send
        + Sync,
>;

/// Validates a recognized value for a field.
///
/// `raw` is `None` when the user explicitly chose no value.
pub fn validate_value(
    record: &OrderRecord,
    field: &FieldDescriptor,
    raw: Option<FieldValue>,
    templates: &FormTemplates,
    custom: Option<&CustomValidator>,
) -> Result<ValidationResult, FormError> {
    let result = match raw {
        None if field.optional => ValidationResult::Accepted(None),
        None => ValidationResult::rejected(render(&templates.required, &[&field.description])),
        Some(value) => check_domain(field, value, templates)?,
    };

    match (&field.validator, result) {
        (ValidatorRef::Custom(name), ValidationResult::Accepted(value)) => {
            let validator = custom.ok_or_else(|| FormError::Validator {
                field: field.name.clone(),
                reason: format!("custom validator '{}' is not registered", name),
            })?;
            validator(record, field, value)
        }
        (_, result) => Ok(result),
    }
}

fn check_domain(
    field: &FieldDescriptor,
    value: FieldValue,
    templates: &FormTemplates,
) -> Result<ValidationResult, FormError> {
    match (&field.kind, value) {
        (FieldKind::Choice { .. }, FieldValue::Choice(choice)) => {
            if field.option(&choice).is_some() {
                Ok(ValidationResult::Accepted(Some(FieldValue::Choice(choice))))
            } else {
                Ok(not_understood(templates, &choice))
            }
        }
        (FieldKind::MultiChoice { options, all_option }, FieldValue::Choices(selected)) => {
            if let Some(unknown) = selected.iter().find(|s| field.option(s).is_none()) {
                return Ok(not_understood(templates, unknown));
            }
            let expand = field.validator == ValidatorRef::ComplementOfSelection;
            let accepted = match all_option {
                Some(all) if expand && selected.contains(all) => options
                    .iter()
                    .filter(|o| &o.value != all && !selected.contains(&o.value))
                    .map(|o| o.value.clone())
                    .collect(),
                _ => options
                    .iter()
                    .filter(|o| selected.contains(&o.value))
                    .map(|o| o.value.clone())
                    .collect::<Vec<_>>(),
            };
            if accepted.is_empty() {
                Ok(ValidationResult::Accepted(None))
            } else {
                Ok(ValidationResult::Accepted(Some(FieldValue::Choices(accepted))))
            }
        }
        (FieldKind::Text { pattern }, FieldValue::Text(text)) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Ok(ValidationResult::rejected(render(
                    &templates.required,
                    &[&field.description],
                )));
            }
            match pattern {
                Some(p) if !p.is_match(&text) => Ok(ValidationResult::rejected(render(
                    &templates.pattern_mismatch,
                    &[&text, &field.description],
                ))),
                _ => Ok(ValidationResult::Accepted(Some(FieldValue::Text(text)))),
            }
        }
        (FieldKind::Number { min, max }, FieldValue::Number(n)) => {
            let below = min.map(|m| n < m).unwrap_or(false);
            let above = max.map(|m| n > m).unwrap_or(false);
            if below || above {
                let bound = |b: &Option<f64>| b.map(|v| v.to_string()).unwrap_or_default();
                Ok(ValidationResult::rejected(render(
                    &templates.out_of_range,
                    &[&field.description, &bound(min), &bound(max)],
                )))
            } else {
                Ok(ValidationResult::Accepted(Some(FieldValue::Number(n))))
            }
        }
        (FieldKind::DateTime, value @ (FieldValue::DateTime(_) | FieldValue::Time(_))) => {
            Ok(ValidationResult::Accepted(Some(value)))
        }
        (_, value) => Err(FormError::ValueKindMismatch {
            field: field.name.clone(),
            actual: value.kind_name(),
        }),
    }
}

fn not_understood(templates: &FormTemplates, input: &str) -> ValidationResult {
    ValidationResult::rejected(render(&templates.not_understood, &[input]))
}
