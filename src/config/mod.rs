//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `STARDUST` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use stardust_bot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default locale: {}", config.dialog.default_locale);
//! ```

mod cache;
mod dialog;
mod error;
mod logging;
mod session;

pub use cache::CacheConfig;
pub use dialog::{DialogConfig, FormSource};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use session::SessionConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// console bot. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default locale and dialog source
    #[serde(default)]
    pub dialog: DialogConfig,

    /// Compiled dialog cache limits
    #[serde(default)]
    pub cache: CacheConfig,

    /// Idle session reaping
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `STARDUST` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `STARDUST__DIALOG__DEFAULT_LOCALE=fr` -> `dialog.default_locale = "fr"`
    /// - `STARDUST__CACHE__TTL_SECS=3600` -> `cache.ttl_secs = 3600`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STARDUST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.dialog.validate()?;
        self.cache.validate()?;
        self.session.validate()?;
        Ok(())
    }
}
