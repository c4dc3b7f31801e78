//! In-memory order processor.
//!
//! Keeps every processed order for inspection. It can be switched into a
//! failing mode to exercise contained processing faults.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::form::OrderRecord;
use crate::ports::{OrderProcessingError, OrderProcessor};

#[derive(Debug, Default)]
pub struct InMemoryOrderProcessor {
    orders: Mutex<Vec<Value>>,
    failing: AtomicBool,
}

impl InMemoryOrderProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a processor that rejects every order.
    pub fn failing() -> Self {
        let processor = Self::default();
        processor.set_failing(true);
        processor
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Processed orders, flattened to JSON, oldest first.
    pub fn orders(&self) -> Vec<Value> {
        self.orders
            .lock()
            .map(|orders| orders.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().map(|orders| orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderProcessor for InMemoryOrderProcessor {
    async fn process(&self, order: &OrderRecord) -> Result<(), OrderProcessingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(OrderProcessingError::Unavailable(
                "in-memory processor is failing".to_string(),
            ));
        }
        self.orders
            .lock()
            .map_err(|_| OrderProcessingError::Unavailable("order store poisoned".to_string()))?
            .push(order.to_json());
        Ok(())
    }
}
