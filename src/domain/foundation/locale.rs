//! Locale value object used to key compiled dialogs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// A normalized locale tag such as `en` or `fr-ca`.
///
/// Tags are lowercased and `_` separators are rewritten to `-`, so
/// `fr_CA` and `fr-ca` name the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parses and normalizes a locale tag.
    pub fn parse(tag: &str) -> Result<Self, ValidationError> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("locale"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid_format(
                "locale",
                format!("'{}' is not a language tag", trimmed),
            ));
        }
        Ok(Self(trimmed.replace('_', "-").to_ascii_lowercase()))
    }

    /// Returns the full normalized tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the primary language subtag (`fr` for `fr-ca`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}
