//! Schema read from disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::form::SchemaFormat;
use crate::ports::{SchemaSource, SchemaSourceError, SchemaText};

/// Reads a JSON or YAML schema file on every load.
///
/// The format follows the file extension.
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> Result<SchemaFormat, SchemaSourceError> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(SchemaFormat::from_extension)
            .ok_or_else(|| SchemaSourceError::UnknownFormat(self.path.display().to_string()))
    }
}

#[async_trait]
impl SchemaSource for FileSchemaSource {
    async fn load(&self) -> Result<SchemaText, SchemaSourceError> {
        let format = self.format()?;
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| SchemaSourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), bytes = content.len(), "Loaded schema file");
        Ok(SchemaText { content, format })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
