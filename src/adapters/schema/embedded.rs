//! Schema compiled into the binary.

use async_trait::async_trait;

use crate::domain::form::SchemaFormat;
use crate::ports::{SchemaSource, SchemaSourceError, SchemaText};

/// The Stardust order schema shipped with the crate.
pub const STARDUST_ORDER_SCHEMA: &str = include_str!("../../../schemas/stardust_order.json");

/// Serves a schema held in memory.
#[derive(Debug, Clone)]
pub struct EmbeddedSchemaSource {
    content: &'static str,
    format: SchemaFormat,
}

impl EmbeddedSchemaSource {
    pub fn new(content: &'static str, format: SchemaFormat) -> Self {
        Self { content, format }
    }

    /// The built-in Stardust order schema.
    pub fn stardust_order() -> Self {
        Self::new(STARDUST_ORDER_SCHEMA, SchemaFormat::Json)
    }
}

impl Default for EmbeddedSchemaSource {
    fn default() -> Self {
        Self::stardust_order()
    }
}

#[async_trait]
impl SchemaSource for EmbeddedSchemaSource {
    async fn load(&self) -> Result<SchemaText, SchemaSourceError> {
        Ok(SchemaText {
            content: self.content.to_string(),
            format: self.format,
        })
    }

    fn describe(&self) -> String {
        "embedded".to_string()
    }
}
