//! Completion and cancellation handling.
//!
//! `ProcessOrderCallback` is attached to compiled dialogs and hands the
//! finished record to the order processor. `CompletionHandler` turns the
//! terminal state of a turn into the closing reply.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::form::{
    CompiledDialog, CompletionCallback, DialogState, OrderRecord, ProcessingFault, TurnOutcome,
};
use crate::domain::foundation::Locale;
use crate::domain::order::text_ids;
use crate::ports::{Localizer, OrderProcessor};

/// Completion callback forwarding finished orders to an `OrderProcessor`.
pub struct ProcessOrderCallback {
    processor: Arc<dyn OrderProcessor>,
    localizer: Arc<dyn Localizer>,
    locale: Locale,
}

impl ProcessOrderCallback {
    pub fn new(
        processor: Arc<dyn OrderProcessor>,
        localizer: Arc<dyn Localizer>,
        locale: Locale,
    ) -> Self {
        Self {
            processor,
            localizer,
            locale,
        }
    }
}

#[async_trait]
impl CompletionCallback for ProcessOrderCallback {
    async fn on_completion(&self, record: &OrderRecord) -> Result<Vec<String>, ProcessingFault> {
        let mut messages = Vec::new();
        match self.localizer.lookup(&self.locale, text_ids::PROCESSING, &[]) {
            Ok(text) => messages.push(text),
            Err(err) => tracing::warn!(error = %err, "Processing notice unavailable"),
        }
        self.processor
            .process(record)
            .await
            .map_err(|e| ProcessingFault(e.to_string()))?;
        Ok(messages)
    }
}

/// Maps terminal dialog states to closing replies.
pub struct CompletionHandler {
    localizer: Arc<dyn Localizer>,
}

impl CompletionHandler {
    pub fn new(localizer: Arc<dyn Localizer>) -> Self {
        Self { localizer }
    }

    /// Closing replies for a turn; empty while the dialog is still open.
    ///
    /// A cancellation names the step by its description in `dialog`. Fault
    /// details stay in the logs. The user only ever sees the generic
    /// apology.
    pub fn closing_messages(
        &self,
        dialog: &CompiledDialog,
        locale: &Locale,
        outcome: &TurnOutcome,
    ) -> Vec<String> {
        let reply = match &outcome.state {
            DialogState::Completed => match &outcome.processing_fault {
                None => self.text(locale, text_ids::PROCESSED, &[]),
                Some(fault) => {
                    tracing::warn!(fault = %fault, "Order completed but processing failed");
                    self.text(locale, text_ids::SHORT_CIRCUIT, &[])
                }
            },
            DialogState::Cancelled { at } => {
                tracing::info!(at = %at, "Order cancelled");
                let step = dialog.describe(at).unwrap_or(at.as_str());
                self.text(locale, text_ids::QUIT_ON, &[step])
            }
            DialogState::Faulted => self.text(locale, text_ids::SHORT_CIRCUIT, &[]),
            DialogState::AwaitingField { .. } | DialogState::AwaitingConfirm { .. } => None,
        };
        reply.into_iter().collect()
    }

    fn text(&self, locale: &Locale, id: &str, args: &[&str]) -> Option<String> {
        self.localizer
            .lookup(locale, id, args)
            .map_err(|e| tracing::error!(error = %e, template = id, "Closing reply unavailable"))
            .ok()
    }
}
