//! Recognition of raw user input.
//!
//! Turns one line of text into a command, a yes/no answer, an explicit
//! "no preference", or a value shaped for the current field. Recognition
//! never consults the record; domain checks happen in validation.

use chrono::{DateTime, NaiveDateTime, NaiveTime};

use super::field::{ChoiceOption, FieldDescriptor, FieldKind, FieldValue};

/// Navigation commands accepted at any prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Back,
    Status,
    Help,
}

/// Outcome of recognizing input for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    Value(FieldValue),
    NoPreference,
    /// The fragment that could not be understood.
    NotUnderstood(String),
}

/// Words recognized for commands and answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputVocabulary {
    pub quit: Vec<String>,
    pub back: Vec<String>,
    pub status: Vec<String>,
    pub help: Vec<String>,
    pub yes: Vec<String>,
    pub no: Vec<String>,
    pub no_preference: Vec<String>,
}

impl Default for InputVocabulary {
    fn default() -> Self {
        fn words(ws: &[&str]) -> Vec<String> {
            ws.iter().map(|w| w.to_string()).collect()
        }
        Self {
            quit: words(&["quit", "cancel", "stop", "exit", "quitter", "annuler"]),
            back: words(&["back", "go back", "retour"]),
            status: words(&["status", "statut"]),
            help: words(&["help", "?", "aide"]),
            yes: words(&["yes", "y", "yeah", "yep", "sure", "ok", "okay", "oui"]),
            no: words(&["no", "n", "nope", "non"]),
            no_preference: words(&["none", "no preference", "skip", "nothing", "aucun", "rien"]),
        }
    }
}

impl InputVocabulary {
    /// Recognizes a navigation command.
    pub fn command(&self, input: &str) -> Option<Command> {
        let normalized = normalize(input);
        if contains(&self.quit, &normalized) {
            Some(Command::Quit)
        } else if contains(&self.back, &normalized) {
            Some(Command::Back)
        } else if contains(&self.status, &normalized) {
            Some(Command::Status)
        } else if contains(&self.help, &normalized) {
            Some(Command::Help)
        } else {
            None
        }
    }

    /// Recognizes a yes/no answer.
    pub fn answer(&self, input: &str) -> Option<bool> {
        let normalized = normalize(input);
        if contains(&self.yes, &normalized) {
            Some(true)
        } else if contains(&self.no, &normalized) {
            Some(false)
        } else {
            None
        }
    }

    /// Returns true if the input explicitly declines a preference.
    pub fn is_no_preference(&self, input: &str) -> bool {
        contains(&self.no_preference, &normalize(input))
    }

    /// Recognizes input for a field.
    ///
    /// "No preference" is only recognized for optional fields.
    pub fn recognize(&self, field: &FieldDescriptor, input: &str) -> Recognition {
        let trimmed = input.trim();
        if field.optional && self.is_no_preference(trimmed) {
            return Recognition::NoPreference;
        }
        if trimmed.is_empty() {
            return Recognition::NotUnderstood(String::new());
        }
        match &field.kind {
            FieldKind::Choice { options } => match match_single(options, trimmed) {
                Some(option) => Recognition::Value(FieldValue::Choice(option.value.clone())),
                None => Recognition::NotUnderstood(trimmed.to_string()),
            },
            FieldKind::MultiChoice { options, .. } => match_many(options, trimmed),
            FieldKind::Text { .. } => Recognition::Value(FieldValue::Text(trimmed.to_string())),
            FieldKind::Number { .. } => match parse_number(trimmed) {
                Some(n) => Recognition::Value(FieldValue::Number(n)),
                None => Recognition::NotUnderstood(trimmed.to_string()),
            },
            FieldKind::DateTime => match parse_datetime(trimmed) {
                Some(value) => Recognition::Value(value),
                None => Recognition::NotUnderstood(trimmed.to_string()),
            },
        }
    }
}

fn normalize(input: &str) -> String {
    input
        .trim()
        .trim_end_matches(['.', '!'])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn contains(words: &[String], normalized: &str) -> bool {
    words.iter().any(|w| w == normalized)
}

fn words_of(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(haystack: &[String], phrase: &str) -> bool {
    let needle = words_of(phrase);
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
}

/// Exact term, 1-based number, or the single option mentioned in a sentence.
fn match_single<'a>(options: &'a [ChoiceOption], text: &str) -> Option<&'a ChoiceOption> {
    let normalized = normalize(text);
    if let Ok(n) = normalized.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i));
    }
    if let Some(option) = options
        .iter()
        .find(|o| o.terms.iter().any(|t| *t == normalized))
    {
        return Some(option);
    }
    let words = words_of(text);
    let mut mentioned = options
        .iter()
        .filter(|o| o.terms.iter().any(|t| contains_phrase(&words, t)));
    match (mentioned.next(), mentioned.next()) {
        (Some(option), None) => Some(option),
        _ => None,
    }
}

fn match_many(options: &[ChoiceOption], text: &str) -> Recognition {
    let mut selected: Vec<String> = Vec::new();
    let lowered = text.to_lowercase();
    let items = lowered
        .split([',', ';', '&'])
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter(|item| !item.is_empty());

    for item in items {
        let mut found: Vec<&ChoiceOption> = Vec::new();
        if let Some(option) = match_single(options, item) {
            found.push(option);
        } else {
            let words = words_of(item);
            found.extend(
                options
                    .iter()
                    .filter(|o| o.terms.iter().any(|t| contains_phrase(&words, t))),
            );
        }
        if found.is_empty() {
            return Recognition::NotUnderstood(item.to_string());
        }
        for option in found {
            if !selected.contains(&option.value) {
                selected.push(option.value.clone());
            }
        }
    }

    if selected.is_empty() {
        Recognition::NotUnderstood(text.trim().to_string())
    } else {
        Recognition::Value(FieldValue::Choices(selected))
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.split_whitespace()
        .find_map(|token| token.trim_end_matches(['.', ',', '!']).parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn parse_datetime(text: &str) -> Option<FieldValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(FieldValue::DateTime(dt.naive_local()));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(FieldValue::DateTime(dt));
        }
    }
    for format in ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"] {
        if let Ok(t) = NaiveTime::parse_from_str(text, format) {
            return Some(FieldValue::Time(t));
        }
    }
    None
}
