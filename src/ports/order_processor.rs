//! OrderProcessor port - Downstream handling of a finished order.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::form::OrderRecord;

/// Errors reported by an order processor.
///
/// They are contained by the completion callback and never reopen the
/// dialog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderProcessingError {
    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Order processor unavailable: {0}")]
    Unavailable(String),
}

/// Port invoked once per completed order.
#[async_trait]
pub trait OrderProcessor: Send + Sync {
    async fn process(&self, order: &OrderRecord) -> Result<(), OrderProcessingError>;
}
