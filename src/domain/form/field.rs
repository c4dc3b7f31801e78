//! Field registry types.
//!
//! A `FieldDescriptor` is pure data: it names a slot, its value domain and
//! the templates used to ask for it. Behavior lives in the validation layer
//! and the runtime.

use chrono::{NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::SchemaError;

/// One selectable value of a choice field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Stored value, e.g. `CaramelMacchiato`.
    pub value: String,
    /// Human-readable label, e.g. `Caramel macchiato`.
    pub label: String,
    /// Lowercase words or phrases that select this option.
    pub terms: Vec<String>,
}

impl ChoiceOption {
    /// Creates an option whose label and default terms derive from its value.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let label = humanize(&value);
        let terms = default_terms(&value, &label);
        Self { value, label, terms }
    }

    /// Adds extra selection terms.
    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for term in terms {
            let term = term.into().to_lowercase();
            if !self.terms.contains(&term) {
                self.terms.push(term);
            }
        }
        self
    }
}

/// Anchored regular expression constraining a text field.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    /// Compiles a pattern. The whole input must match it.
    pub fn new(field: &str, source: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(&format!("^(?:{})$", source))
            .map_err(|e| SchemaError::malformed(field, format!("invalid pattern: {}", e)))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Returns the pattern as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the whole input matches.
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Value domain of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Exactly one option.
    Choice { options: Vec<ChoiceOption> },
    /// Any subset of the options. `all_option` names the sentinel that
    /// expands into the complement of the rest of the selection.
    MultiChoice {
        options: Vec<ChoiceOption>,
        all_option: Option<String>,
    },
    /// Free text, optionally constrained by a pattern.
    Text { pattern: Option<TextPattern> },
    /// Number within an inclusive range.
    Number { min: Option<f64>, max: Option<f64> },
    /// Date and time, or a time of day.
    DateTime,
}

impl FieldKind {
    /// Returns the options of a choice-like field.
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            FieldKind::Choice { options } | FieldKind::MultiChoice { options, .. } => options,
            _ => &[],
        }
    }

    /// Returns the validator this kind maps to when nothing else is declared.
    pub fn default_validator(&self) -> ValidatorRef {
        match self {
            FieldKind::MultiChoice {
                all_option: Some(_),
                ..
            } => ValidatorRef::ComplementOfSelection,
            _ => ValidatorRef::Standard,
        }
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Choice { .. } => "choice",
            FieldKind::MultiChoice { .. } => "multi_choice",
            FieldKind::Text { .. } => "text",
            FieldKind::Number { .. } => "number",
            FieldKind::DateTime => "datetime",
        }
    }
}

/// Reference to the validator applied after a value is recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorRef {
    /// Domain checks for the field kind only.
    Standard,
    /// Multi-select with sentinel: the sentinel expands into every other
    /// option not explicitly selected.
    ComplementOfSelection,
    /// A validator registered on the builder under this name.
    Custom(String),
}

/// Declarative guard deciding whether a field step is presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCondition {
    /// Field whose value is inspected.
    pub field: String,
    /// Required choice value; `None` only requires the field to be set.
    #[serde(default)]
    pub equals: Option<String>,
}

/// Description of one collectible field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Lowercase description used for `{&}` in templates.
    pub description: String,
    pub kind: FieldKind,
    pub optional: bool,
    /// Prompt template; `{&}` is the description, `{||}` the option list.
    pub prompt: String,
    /// Display template used by status summaries; `{}` is the value and
    /// `{:t}` its short time.
    pub display: String,
    pub validator: ValidatorRef,
}

impl FieldDescriptor {
    /// Creates a required field with default templates.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let description = humanize(&name).to_lowercase();
        let prompt = match kind {
            FieldKind::Choice { .. } | FieldKind::MultiChoice { .. } => {
                "Please select a {&} {||}".to_string()
            }
            _ => "Please enter {&}".to_string(),
        };
        let validator = kind.default_validator();
        Self {
            name,
            description,
            kind,
            optional: false,
            prompt,
            display: "{&}: {}".to_string(),
            validator,
        }
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Overrides the prompt template.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Overrides the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Overrides the display template.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Uses a named custom validator.
    pub fn with_validator(mut self, validator: ValidatorRef) -> Self {
        self.validator = validator;
        self
    }

    /// Finds an option by stored value.
    pub fn option(&self, value: &str) -> Option<&ChoiceOption> {
        self.kind.options().iter().find(|o| o.value == value)
    }

    /// Renders a value the way the user should read it.
    pub fn display_value(&self, value: &FieldValue) -> String {
        let label = |v: &String| {
            self.option(v)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| v.clone())
        };
        match value {
            FieldValue::Choice(v) => label(v),
            FieldValue::Choices(vs) => vs.iter().map(label).collect::<Vec<_>>().join(", "),
            other => other.to_string(),
        }
    }

    /// Checks the internal consistency of the declared constraints.
    pub fn check(&self) -> Result<(), SchemaError> {
        match &self.kind {
            FieldKind::Choice { options } => self.check_options(options),
            FieldKind::MultiChoice {
                options,
                all_option,
            } => {
                self.check_options(options)?;
                if let Some(all) = all_option {
                    if self.option(all).is_none() {
                        return Err(SchemaError::malformed(
                            &self.name,
                            format!("all option '{}' is not one of the options", all),
                        ));
                    }
                }
                if self.validator == ValidatorRef::ComplementOfSelection && all_option.is_none() {
                    return Err(SchemaError::malformed(
                        &self.name,
                        "complement validator requires an all option",
                    ));
                }
                Ok(())
            }
            FieldKind::Number {
                min: Some(min),
                max: Some(max),
            } if min > max => Err(SchemaError::malformed(
                &self.name,
                format!("min {} exceeds max {}", min, max),
            )),
            _ => Ok(()),
        }
    }

    fn check_options(&self, options: &[ChoiceOption]) -> Result<(), SchemaError> {
        if options.is_empty() {
            return Err(SchemaError::malformed(&self.name, "no options declared"));
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].iter().any(|o| o.value == option.value) {
                return Err(SchemaError::malformed(
                    &self.name,
                    format!("option '{}' is declared twice", option.value),
                ));
            }
        }
        Ok(())
    }
}

/// A recognized value for one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Choice(String),
    Choices(Vec<String>),
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl FieldValue {
    /// Short name of the value shape.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Choice(_) => "choice",
            FieldValue::Choices(_) => "choices",
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Time(_) => "time",
        }
    }

    /// Returns the stored choice value.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            FieldValue::Choice(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Choice(v) | FieldValue::Text(v) => f.write_str(v),
            FieldValue::Choices(vs) => f.write_str(&vs.join(", ")),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            FieldValue::Time(t) => write!(f, "{}", t.format("%H:%M")),
        }
    }
}

/// Splits an identifier into words: `CaramelMacchiato` -> `Caramel macchiato`.
pub fn humanize(ident: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = ident.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let boundary = c.is_uppercase()
            && i > 0
            && (chars[i - 1].is_lowercase()
                || chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(&word.to_lowercase());
        } else {
            let mut cs = word.chars();
            if let Some(first) = cs.next() {
                out.extend(first.to_uppercase());
                out.push_str(&cs.as_str().to_lowercase());
            }
        }
    }
    out
}

fn default_terms(value: &str, label: &str) -> Vec<String> {
    let mut terms = vec![label.to_lowercase()];
    let value = value.to_lowercase();
    if !terms.contains(&value) {
        terms.push(value);
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    mod humanize {
        use super::*;

        #[test]
        fn splits_camel_case() {
            assert_eq!(humanize("CaramelMacchiato"), "Caramel macchiato");
            assert_eq!(humanize("ALittleBitOfSugar"), "A little bit of sugar");
        }

        #[test]
        fn keeps_single_words() {
            assert_eq!(humanize("Milk"), "Milk");
            assert_eq!(humanize("delivery_time"), "Delivery time");
        }
    }

    mod choice_option {
        use super::*;

        #[test]
        fn derives_label_and_terms() {
            let option = ChoiceOption::new("CaramelMacchiato");
            assert_eq!(option.label, "Caramel macchiato");
            assert_eq!(option.terms, vec!["caramel macchiato", "caramelmacchiato"]);
        }

        #[test]
        fn with_terms_lowercases_and_deduplicates() {
            let option = ChoiceOption::new("Everything").with_terms(["All", "everything"]);
            assert_eq!(option.terms, vec!["everything", "all"]);
        }
    }

    mod descriptor {
        use super::*;

        fn toppings(all: Option<&str>) -> FieldDescriptor {
            FieldDescriptor::new(
                "Toppings",
                FieldKind::MultiChoice {
                    options: vec![ChoiceOption::new("Milk"), ChoiceOption::new("Everything")],
                    all_option: all.map(str::to_string),
                },
            )
        }

        #[test]
        fn description_derives_from_name() {
            let field = FieldDescriptor::new("DeliveryAddress", FieldKind::Text { pattern: None });
            assert_eq!(field.description, "delivery address");
            assert!(!field.optional);
        }

        #[test]
        fn sentinel_field_maps_to_complement_validator() {
            assert_eq!(
                toppings(Some("Everything")).validator,
                ValidatorRef::ComplementOfSelection
            );
            assert_eq!(toppings(None).validator, ValidatorRef::Standard);
        }

        #[test]
        fn check_rejects_unknown_sentinel() {
            let err = toppings(Some("Sprinkles")).check().unwrap_err();
            assert!(matches!(err, SchemaError::MalformedConstraint { .. }));
        }

        #[test]
        fn check_rejects_inverted_range() {
            let field = FieldDescriptor::new(
                "Rating",
                FieldKind::Number {
                    min: Some(5.0),
                    max: Some(1.0),
                },
            );
            assert!(field.check().is_err());
        }

        #[test]
        fn check_rejects_empty_options() {
            let field = FieldDescriptor::new("Coffee", FieldKind::Choice { options: vec![] });
            assert!(field.check().is_err());
        }

        #[test]
        fn display_value_uses_labels() {
            let field = toppings(Some("Everything"));
            let value = FieldValue::Choices(vec!["Milk".into(), "Everything".into()]);
            assert_eq!(field.display_value(&value), "Milk, Everything");
        }
    }

    mod text_pattern {
        use super::*;

        #[test]
        fn whole_input_must_match() {
            let pattern = TextPattern::new("Phone", r"\d{3}-\d{4}").unwrap();
            assert!(pattern.is_match("555-1234"));
            assert!(!pattern.is_match("call 555-1234 now"));
        }

        #[test]
        fn alternation_is_anchored_as_a_whole() {
            let pattern = TextPattern::new("Size", "small|large").unwrap();
            assert!(pattern.is_match("large"));
            assert!(!pattern.is_match("smallish"));
            assert!(!pattern.is_match("extra large"));
            assert_eq!(pattern.as_str(), "small|large");
        }

        #[test]
        fn invalid_regex_is_malformed_constraint() {
            let err = TextPattern::new("Phone", r"(\d{3}").unwrap_err();
            assert!(matches!(err, SchemaError::MalformedConstraint { field, .. } if field == "Phone"));
        }
    }

    #[test]
    fn field_value_serializes_tagged() {
        let json = serde_json::to_value(FieldValue::Number(4.0)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "number", "value": 4.0}));
    }
}
