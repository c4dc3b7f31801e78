//! SchemaSource port - Supplies the document for dynamic dialogs.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::form::SchemaFormat;

/// Raw schema text with its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaText {
    pub content: String,
    pub format: SchemaFormat,
}

/// Errors that can occur while loading a schema document.
#[derive(Debug, Error)]
pub enum SchemaSourceError {
    #[error("Schema file '{path}' could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema file '{0}' has no recognizable format (expected .json, .yaml or .yml)")]
    UnknownFormat(String),
}

/// Port for retrieving schema documents.
///
/// This is the only operation in the dialog core allowed to touch disk.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn load(&self) -> Result<SchemaText, SchemaSourceError>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}
