//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the dialog engine and its collaborators. Adapters implement these ports.
//!
//! - `Localizer` - Localized texts keyed by locale and template id
//! - `OrderProcessor` - Downstream handling of finished orders
//! - `SchemaSource` - Documents for dynamically compiled dialogs

mod localizer;
mod order_processor;
mod schema_source;

pub use localizer::{LocalizationError, Localizer};
pub use order_processor::{OrderProcessingError, OrderProcessor};
pub use schema_source::{SchemaSource, SchemaSourceError, SchemaText};
