//! Dynamic front-end: compiles a declarative schema document.
//!
//! A schema lists fields with a type name and constraints, plus optional
//! welcome/closing messages and confirm steps whose prompts reference field
//! values as `{FieldName}`. Parsing and mapping never panic; every problem
//! becomes a `SchemaError` for this compilation only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::builder::FormBuilder;
use super::dialog::{CompiledDialog, CompletionCallback};
use super::errors::SchemaError;
use super::field::{
    ChoiceOption, FieldCondition, FieldDescriptor, FieldKind, TextPattern, ValidatorRef,
};
use super::record::OrderRecord;
use super::step::ConfirmStep;

/// Encoding of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    /// Guesses the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(SchemaFormat::Json),
            "yaml" | "yml" => Some(SchemaFormat::Yaml),
            _ => None,
        }
    }
}

/// Root of a schema document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    #[serde(default)]
    pub messages: SchemaMessages,
    pub fields: Vec<SchemaField>,
    #[serde(default)]
    pub confirms: Vec<SchemaConfirm>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchemaMessages {
    pub welcome: Option<String>,
    pub closing: Option<String>,
}

/// One field entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub optional: bool,
    pub prompt: Option<String>,
    pub describe: Option<String>,
    /// Status line template; `{&}` is the description, `{}` the value.
    pub display: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    pub all_option: Option<String>,
    /// Extra selection terms per option value.
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<String>>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub validator: Option<ValidatorRef>,
    pub active_when: Option<FieldCondition>,
}

/// A confirm step placed after a field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaConfirm {
    pub name: String,
    /// Field after which the confirm is asked.
    pub after: String,
    /// Prompt template; `{FieldName}` is replaced by the field's value.
    pub prompt: String,
    pub describe: Option<String>,
}

impl SchemaDocument {
    pub fn parse_json(content: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    pub fn parse_yaml(content: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    pub fn parse(content: &str, format: SchemaFormat) -> Result<Self, SchemaError> {
        match format {
            SchemaFormat::Json => Self::parse_json(content),
            SchemaFormat::Yaml => Self::parse_yaml(content),
        }
    }

    /// Maps every field entry to a descriptor.
    pub fn descriptors(&self) -> Result<Vec<FieldDescriptor>, SchemaError> {
        self.fields.iter().map(SchemaField::to_descriptor).collect()
    }
}

impl SchemaField {
    /// Maps the entry to a descriptor, inferring the kind from its type name.
    pub fn to_descriptor(&self) -> Result<FieldDescriptor, SchemaError> {
        let kind = match self.field_type.to_ascii_lowercase().as_str() {
            "choice" | "enum" => FieldKind::Choice {
                options: self.choice_options()?,
            },
            "multi_choice" | "list" => FieldKind::MultiChoice {
                options: self.choice_options()?,
                all_option: self.all_option.clone(),
            },
            "text" | "string" => FieldKind::Text {
                pattern: self
                    .pattern
                    .as_deref()
                    .map(|p| TextPattern::new(&self.name, p))
                    .transpose()?,
            },
            "number" | "integer" | "double" => FieldKind::Number {
                min: self.min,
                max: self.max,
            },
            "datetime" | "date" => FieldKind::DateTime,
            other => {
                return Err(SchemaError::UnknownFieldType {
                    field: self.name.clone(),
                    field_type: other.to_string(),
                })
            }
        };
        self.check_constraints(&kind)?;

        let mut descriptor = FieldDescriptor::new(self.name.clone(), kind);
        if self.optional {
            descriptor = descriptor.optional();
        }
        if let Some(describe) = &self.describe {
            descriptor = descriptor.with_description(describe.clone());
        }
        if let Some(prompt) = &self.prompt {
            descriptor = descriptor.with_prompt(prompt.clone());
        }
        if let Some(display) = &self.display {
            descriptor = descriptor.with_display(display.clone());
        }
        if let Some(validator) = &self.validator {
            descriptor = descriptor.with_validator(validator.clone());
        }
        Ok(descriptor)
    }

    fn choice_options(&self) -> Result<Vec<ChoiceOption>, SchemaError> {
        if let Some(unknown) = self.terms.keys().find(|k| !self.options.contains(k)) {
            return Err(SchemaError::malformed(
                &self.name,
                format!("terms given for unknown option '{}'", unknown),
            ));
        }
        Ok(self
            .options
            .iter()
            .map(|value| {
                let option = ChoiceOption::new(value.clone());
                match self.terms.get(value) {
                    Some(terms) => option.with_terms(terms.iter().cloned()),
                    None => option,
                }
            })
            .collect())
    }

    fn check_constraints(&self, kind: &FieldKind) -> Result<(), SchemaError> {
        let misplaced = match kind {
            FieldKind::Choice { .. } => self.pattern.is_some() || self.has_range() || self.all_option.is_some(),
            FieldKind::MultiChoice { .. } => self.pattern.is_some() || self.has_range(),
            FieldKind::Text { .. } => !self.options.is_empty() || self.has_range(),
            FieldKind::Number { .. } => !self.options.is_empty() || self.pattern.is_some(),
            FieldKind::DateTime => {
                !self.options.is_empty() || self.pattern.is_some() || self.has_range()
            }
        };
        if misplaced {
            return Err(SchemaError::malformed(
                &self.name,
                format!("constraint does not apply to a {} field", kind.name()),
            ));
        }
        Ok(())
    }

    fn has_range(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

impl FormBuilder {
    /// Starts a builder from a schema document.
    ///
    /// Fields are placed in document order, each confirm right after the
    /// field it names, framed by the welcome and closing messages.
    pub fn from_schema(document: &SchemaDocument) -> Result<Self, SchemaError> {
        let mut builder = FormBuilder::new(document.name.clone());
        for descriptor in document.descriptors()? {
            builder = builder.declare(descriptor);
        }
        for confirm in &document.confirms {
            if !document.fields.iter().any(|f| f.name == confirm.after) {
                return Err(SchemaError::UnknownReference {
                    kind: "field",
                    name: confirm.after.clone(),
                });
            }
        }

        if let Some(welcome) = &document.messages.welcome {
            builder = builder.message(welcome.clone());
        }
        for field in &document.fields {
            builder = match &field.active_when {
                Some(condition) => builder.field_when(field.name.clone(), condition.clone()),
                None => builder.field(field.name.clone()),
            };
            for confirm in document.confirms.iter().filter(|c| c.after == field.name) {
                builder = builder.confirm(template_confirm(confirm, document));
            }
        }
        if let Some(closing) = &document.messages.closing {
            builder = builder.message(closing.clone());
        }
        Ok(builder)
    }
}

/// Compiles a schema document into a dialog.
pub fn compile_from_schema(
    document: &SchemaDocument,
    on_completion: Option<Arc<dyn CompletionCallback>>,
) -> Result<CompiledDialog, SchemaError> {
    let builder = FormBuilder::from_schema(document)?;
    match on_completion {
        Some(callback) => builder.on_completion(callback),
        None => builder,
    }
    .build()
}

fn template_confirm(confirm: &SchemaConfirm, document: &SchemaDocument) -> ConfirmStep {
    let template = confirm.prompt.clone();
    let names: Vec<String> = document.fields.iter().map(|f| f.name.clone()).collect();
    let description = confirm
        .describe
        .clone()
        .unwrap_or_else(|| confirm.name.to_lowercase());
    ConfirmStep::new(confirm.name.clone(), description, move |record: &OrderRecord| {
        Ok(names.iter().fold(template.clone(), |text, name| {
            let value = record.value(name).map(|v| v.to_string()).unwrap_or_default();
            text.replace(&format!("{{{}}}", name), &value)
        }))
    })
}
