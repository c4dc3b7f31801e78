//! Schema source adapters.

mod embedded;
mod file;

pub use embedded::{EmbeddedSchemaSource, STARDUST_ORDER_SCHEMA};
pub use file::FileSchemaSource;
