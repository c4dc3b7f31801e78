//! Localizer port - Resolves human-readable texts per locale.
//!
//! The dialog engine never hard-codes user-facing strings for a locale; it
//! asks a `Localizer` by template id and renders positional `{n}` arguments.

use thiserror::Error;

use crate::domain::foundation::Locale;

/// Errors that can occur while resolving a text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalizationError {
    #[error("Template '{template_id}' is not defined for locale '{locale}'")]
    MissingTemplate { locale: String, template_id: String },

    #[error("Locale '{0}' is not supported")]
    UnsupportedLocale(String),
}

/// Port for localized text lookup.
///
/// Implementations must be cheap to call; lookups happen while dialogs
/// are compiled and once per terminal reply.
pub trait Localizer: Send + Sync {
    /// Returns the text for `template_id`, with `{0}`, `{1}`, ... replaced
    /// by `args`. Placeholders without an argument are left untouched.
    fn lookup(
        &self,
        locale: &Locale,
        template_id: &str,
        args: &[&str],
    ) -> Result<String, LocalizationError>;

    /// Locales with a dedicated table.
    fn supported_locales(&self) -> Vec<Locale>;
}
