//! Built-in dialog templates and the substitutions applied to them.
//!
//! Placeholders:
//! - `{0}`, `{1}`, ... positional arguments
//! - `{&}` the field description
//! - `{||}` the option list of a choice field
//! - `{}` the current value in a display template
//! - `{:t}` the current value as a short time in a display template

use super::field::{FieldDescriptor, FieldKind, FieldValue};

/// Identifiers of the generic templates every locale must provide.
pub mod ids {
    pub const NOT_UNDERSTOOD: &str = "not_understood";
    pub const OUT_OF_RANGE: &str = "out_of_range";
    pub const PATTERN_MISMATCH: &str = "pattern_mismatch";
    pub const REQUIRED: &str = "required";
    pub const NO_PREFERENCE: &str = "no_preference";
    pub const STATUS_HEADER: &str = "status_header";
    pub const UNSPECIFIED: &str = "unspecified";

    /// All generic template ids, in field order of `FormTemplates`.
    pub const ALL: [&str; 7] = [
        NOT_UNDERSTOOD,
        OUT_OF_RANGE,
        PATTERN_MISMATCH,
        REQUIRED,
        NO_PREFERENCE,
        STATUS_HEADER,
        UNSPECIFIED,
    ];
}

/// Generic texts used by validation and the runtime, resolved per locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTemplates {
    /// `{0}`: the raw input.
    pub not_understood: String,
    /// `{0}`: description, `{1}`: min, `{2}`: max.
    pub out_of_range: String,
    /// `{0}`: the raw input, `{1}`: description.
    pub pattern_mismatch: String,
    /// `{0}`: description.
    pub required: String,
    pub no_preference: String,
    pub status_header: String,
    pub unspecified: String,
}

impl Default for FormTemplates {
    fn default() -> Self {
        Self {
            not_understood: "I do not understand \"{0}\".".to_string(),
            out_of_range: "Please enter a value between {1} and {2} for {0}.".to_string(),
            pattern_mismatch: "\"{0}\" is not a valid {1}.".to_string(),
            required: "A {0} is required.".to_string(),
            no_preference: "No preference".to_string(),
            status_header: "Here is your order so far:".to_string(),
            unspecified: "Unspecified".to_string(),
        }
    }
}

impl FormTemplates {
    /// Builds templates from a lookup over `ids::ALL`.
    pub fn from_lookup<E, F>(mut lookup: F) -> Result<Self, E>
    where
        F: FnMut(&'static str) -> Result<String, E>,
    {
        Ok(Self {
            not_understood: lookup(ids::NOT_UNDERSTOOD)?,
            out_of_range: lookup(ids::OUT_OF_RANGE)?,
            pattern_mismatch: lookup(ids::PATTERN_MISMATCH)?,
            required: lookup(ids::REQUIRED)?,
            no_preference: lookup(ids::NO_PREFERENCE)?,
            status_header: lookup(ids::STATUS_HEADER)?,
            unspecified: lookup(ids::UNSPECIFIED)?,
        })
    }
}

/// Substitutes positional `{n}` arguments in one pass over the template.
///
/// Argument text is copied as is, and placeholders without an argument
/// are kept.
pub fn render(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let arg = if digits > 0 && after[digits..].starts_with('}') {
            after[..digits].parse::<usize>().ok().and_then(|i| args.get(i))
        } else {
            None
        };
        match arg {
            Some(arg) => {
                out.push_str(arg);
                rest = &after[digits + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders the prompt of a field, listing its options.
pub fn render_prompt(field: &FieldDescriptor, templates: &FormTemplates) -> String {
    let prompt = field.prompt.replace("{&}", &field.description);
    let list = option_list(field, templates);
    if prompt.contains("{||}") {
        prompt.replace("{||}", &list).trim_end().to_string()
    } else {
        prompt
    }
}

/// Renders one status line for a field.
pub fn render_display(
    field: &FieldDescriptor,
    value: Option<&FieldValue>,
    answered: bool,
    templates: &FormTemplates,
) -> String {
    let shown = match (value, answered) {
        (Some(value), _) => field.display_value(value),
        (None, true) => templates.no_preference.clone(),
        (None, false) => templates.unspecified.clone(),
    };
    let short_time = match value {
        Some(FieldValue::DateTime(dt)) => dt.format("%H:%M").to_string(),
        _ => shown.clone(),
    };
    field
        .display
        .replace("{&}", &capitalize(&field.description))
        .replace("{:t}", &short_time)
        .replace("{}", &shown)
}

fn option_list(field: &FieldDescriptor, templates: &FormTemplates) -> String {
    let options = match &field.kind {
        FieldKind::Choice { options } | FieldKind::MultiChoice { options, .. } => options,
        _ => return String::new(),
    };
    let mut items: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {}", i + 1, o.label))
        .collect();
    if field.optional {
        items.push(templates.no_preference.clone());
    }
    format!("({})", items.join(", "))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::field::ChoiceOption;

    fn sugar() -> FieldDescriptor {
        FieldDescriptor::new(
            "Sugar",
            FieldKind::Choice {
                options: vec![ChoiceOption::new("ALittleBitOfSugar"), ChoiceOption::new("ALot")],
            },
        )
        .optional()
        .with_prompt("Do you want some {&}? {||}")
    }

    #[test]
    fn render_substitutes_positional_arguments() {
        assert_eq!(
            render("Please enter a value between {1} and {2} for {0}.", &["rating", "1", "5"]),
            "Please enter a value between 1 and 5 for rating."
        );
    }

    #[test]
    fn render_does_not_expand_placeholders_inside_arguments() {
        assert_eq!(
            render("\"{0}\" is not a valid {1}.", &["{1}", "phone number"]),
            "\"{1}\" is not a valid phone number."
        );
    }

    #[test]
    fn render_keeps_unmatched_braces() {
        assert_eq!(render("{} {x} {7} {0", &["a"]), "{} {x} {7} {0");
        assert_eq!(render("{0}{0}", &["ab"]), "abab");
    }

    #[test]
    fn render_prompt_lists_options_and_no_preference() {
        let prompt = render_prompt(&sugar(), &FormTemplates::default());
        assert_eq!(
            prompt,
            "Do you want some sugar? (1. A little bit of sugar, 2. A lot, No preference)"
        );
    }

    #[test]
    fn render_prompt_without_list_placeholder_keeps_text() {
        let field = FieldDescriptor::new("Name", FieldKind::Text { pattern: None });
        assert_eq!(
            render_prompt(&field, &FormTemplates::default()),
            "Please enter name"
        );
    }

    #[test]
    fn render_display_distinguishes_skipped_and_unset() {
        let templates = FormTemplates::default();
        let field = sugar();
        assert_eq!(
            render_display(&field, None, true, &templates),
            "Sugar: No preference"
        );
        assert_eq!(
            render_display(&field, None, false, &templates),
            "Sugar: Unspecified"
        );
        assert_eq!(
            render_display(&field, Some(&FieldValue::Choice("ALot".into())), true, &templates),
            "Sugar: A lot"
        );
    }

    #[test]
    fn render_display_short_time_keeps_only_the_clock() {
        let templates = FormTemplates::default();
        let field =
            FieldDescriptor::new("DeliveryTime", FieldKind::DateTime).with_display("{&}: {:t}");
        let value = FieldValue::DateTime(
            chrono::NaiveDate::from_ymd_opt(2026, 3, 4)
                .and_then(|d| d.and_hms_opt(14, 30, 0))
                .unwrap(),
        );
        assert_eq!(
            render_display(&field, Some(&value), true, &templates),
            "Delivery time: 14:30"
        );
        assert_eq!(
            render_display(&field, None, false, &templates),
            "Delivery time: Unspecified"
        );
    }

    #[test]
    fn from_lookup_propagates_missing_template() {
        let result: Result<FormTemplates, String> = FormTemplates::from_lookup(|id| {
            if id == ids::STATUS_HEADER {
                Err(id.to_string())
            } else {
                Ok(id.to_uppercase())
            }
        });
        assert_eq!(result.unwrap_err(), "status_header");
    }
}
