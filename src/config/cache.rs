//! Dialog cache configuration

use serde::Deserialize;

use crate::application::CachePolicy;

use super::error::ValidationError;

/// Locale cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a compiled dialog; unset keeps it until restart
    pub ttl_secs: Option<u64>,

    /// Number of locales kept before the oldest is evicted
    #[serde(default = "default_max_locales")]
    pub max_locales: usize,
}

impl CacheConfig {
    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            ttl_secs: self.ttl_secs,
            max_locales: self.max_locales,
        }
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_locales == 0 {
            return Err(ValidationError::InvalidCacheSize);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: None,
            max_locales: default_max_locales(),
        }
    }
}

fn default_max_locales() -> usize {
    32
}
