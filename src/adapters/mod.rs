//! Adapters - Implementations of port interfaces.
//!
//! - `localization` - Built-in English and French text tables
//! - `order` - Order processors (logging, in-memory)
//! - `schema` - Schema sources (embedded, file)

pub mod localization;
pub mod order;
pub mod schema;

pub use localization::StaticLocalizer;
pub use order::{InMemoryOrderProcessor, LoggingOrderProcessor};
pub use schema::{EmbeddedSchemaSource, FileSchemaSource};
