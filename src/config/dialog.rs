//! Dialog configuration

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::foundation::Locale;

use super::error::ValidationError;

/// Where the order dialog is declared
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormSource {
    /// Compile-time declaration with localized texts
    #[default]
    Static,
    /// Schema document, from `schema_path` or the embedded default
    Schema,
}

/// Dialog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DialogConfig {
    /// Locale used when a conversation does not name one
    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default)]
    pub form_source: FormSource,

    /// Schema document read by the schema source; the embedded schema is
    /// used when absent
    pub schema_path: Option<PathBuf>,
}

impl DialogConfig {
    /// Parsed default locale
    pub fn locale(&self) -> Result<Locale, ValidationError> {
        Locale::parse(&self.default_locale)
            .map_err(|_| ValidationError::InvalidLocale(self.default_locale.clone()))
    }

    /// Validate dialog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_locale.trim().is_empty() {
            return Err(ValidationError::MissingRequired("dialog.default_locale"));
        }
        self.locale()?;
        if let Some(path) = &self.schema_path {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::EmptySchemaPath);
            }
        }
        Ok(())
    }
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            form_source: FormSource::default(),
            schema_path: None,
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_static_english() {
        let config = DialogConfig::default();
        assert_eq!(config.form_source, FormSource::Static);
        assert_eq!(config.locale().unwrap().as_str(), "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_locale_is_missing() {
        let config = DialogConfig {
            default_locale: String::new(),
            ..DialogConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("dialog.default_locale"))
        );
    }

    #[test]
    fn malformed_locale_is_rejected() {
        let config = DialogConfig {
            default_locale: "en us".to_string(),
            ..DialogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLocale(_))
        ));
    }
}
