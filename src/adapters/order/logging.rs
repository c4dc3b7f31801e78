//! Order processor that only records finished orders in the log.

use async_trait::async_trait;

use crate::domain::form::OrderRecord;
use crate::ports::{OrderProcessingError, OrderProcessor};

/// Logs each finished order as structured JSON.
#[derive(Debug, Clone, Default)]
pub struct LoggingOrderProcessor;

impl LoggingOrderProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderProcessor for LoggingOrderProcessor {
    async fn process(&self, order: &OrderRecord) -> Result<(), OrderProcessingError> {
        tracing::info!(order = %order.to_json(), "Order received");
        Ok(())
    }
}
