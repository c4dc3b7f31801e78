//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid default locale: {0}")]
    InvalidLocale(String),

    #[error("Schema path must not be empty")]
    EmptySchemaPath,

    #[error("Cache must allow at least one locale")]
    InvalidCacheSize,

    #[error("Session idle timeout must be positive")]
    InvalidIdleTimeout,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogFilter(String),
}
