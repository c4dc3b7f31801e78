//! Order processor adapters.

mod in_memory;
mod logging;

pub use in_memory::InMemoryOrderProcessor;
pub use logging::LoggingOrderProcessor;
