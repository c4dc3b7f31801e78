//! Dialog runtime.
//!
//! A `FormSession` executes one compiled dialog for one conversation. Each
//! call to `handle_input` is one turn: it runs to a new state and returns
//! the messages to send. Sessions are not shared; the caller serializes
//! turns per session.
//!
//! Internal failures never escape a turn. They are logged and the session
//! moves to `DialogState::Faulted`, leaving the user-facing apology to the
//! completion handler.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::StateMachine;

use super::dialog::CompiledDialog;
use super::errors::{FormError, ProcessingFault};
use super::field::FieldValue;
use super::input::{Command, Recognition};
use super::record::{OrderRecord, Slot};
use super::state::DialogState;
use super::step::Step;
use super::templates::{render, render_display};
use super::validation::ValidationResult;

/// Result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Messages to forward to the user, in order.
    pub messages: Vec<String>,
    /// State after the turn.
    pub state: DialogState,
    /// Set when the completion callback failed during this turn.
    pub processing_fault: Option<ProcessingFault>,
}

/// One in-progress conversation against a compiled dialog.
pub struct FormSession {
    dialog: Arc<CompiledDialog>,
    record: OrderRecord,
    state: DialogState,
    /// Index of the step currently asked.
    cursor: usize,
    /// Step indices answered so far, most recent last.
    history: Vec<usize>,
    shown_messages: HashSet<usize>,
    accepted_confirms: HashSet<usize>,
    completion_invoked: bool,
}

impl FormSession {
    pub fn new(dialog: Arc<CompiledDialog>) -> Self {
        let record = dialog.new_record();
        Self {
            dialog,
            record,
            state: DialogState::initial(),
            cursor: 0,
            history: Vec::new(),
            shown_messages: HashSet::new(),
            accepted_confirms: HashSet::new(),
            completion_invoked: false,
        }
    }

    pub fn dialog(&self) -> &Arc<CompiledDialog> {
        &self.dialog
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn record(&self) -> &OrderRecord {
        &self.record
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Shows the leading messages and asks the first step.
    pub async fn start(&mut self) -> TurnOutcome {
        let mut messages = Vec::new();
        let result = if self.history.is_empty() && self.shown_messages.is_empty() {
            self.advance(0, &mut messages)
        } else {
            self.reprompt(&mut messages)
        };
        self.finish_turn(result, messages).await
    }

    /// Processes one line of user input.
    pub async fn handle_input(&mut self, input: &str) -> TurnOutcome {
        if self.is_finished() {
            tracing::debug!(state = ?self.state, "Ignoring input for finished dialog");
            return TurnOutcome {
                messages: Vec::new(),
                state: self.state.clone(),
                processing_fault: None,
            };
        }
        let mut messages = Vec::new();
        let result = self.apply(input, &mut messages);
        self.finish_turn(result, messages).await
    }

    async fn finish_turn(
        &mut self,
        result: Result<(), FormError>,
        mut messages: Vec<String>,
    ) -> TurnOutcome {
        if let Err(err) = result {
            tracing::error!(
                dialog = %self.dialog.name(),
                cursor = self.cursor,
                error = %err,
                "Dialog turn faulted"
            );
            self.state = DialogState::Faulted;
            return TurnOutcome {
                messages: Vec::new(),
                state: DialogState::Faulted,
                processing_fault: None,
            };
        }

        let mut processing_fault = None;
        if self.state == DialogState::Completed && !self.completion_invoked {
            self.completion_invoked = true;
            if let Some(callback) = self.dialog.completion_callback().cloned() {
                match callback.on_completion(&self.record).await {
                    Ok(extra) => messages.extend(extra),
                    Err(fault) => {
                        tracing::warn!(dialog = %self.dialog.name(), error = %fault, "Completion callback failed");
                        processing_fault = Some(fault);
                    }
                }
            }
        }

        TurnOutcome {
            messages,
            state: self.state.clone(),
            processing_fault,
        }
    }

    fn apply(&mut self, input: &str, out: &mut Vec<String>) -> Result<(), FormError> {
        let dialog = Arc::clone(&self.dialog);
        if let Some(command) = dialog.vocabulary().command(input) {
            return self.apply_command(&dialog, command, out);
        }
        match self.state.clone() {
            DialogState::AwaitingField { field } => self.answer_field(&dialog, field, input, out),
            DialogState::AwaitingConfirm { confirm } => {
                self.answer_confirm(&dialog, confirm, input, out)
            }
            _ => Ok(()),
        }
    }

    fn answer_field(
        &mut self,
        dialog: &CompiledDialog,
        field: usize,
        input: &str,
        out: &mut Vec<String>,
    ) -> Result<(), FormError> {
        let descriptor = dialog.field_at(field)?;
        match dialog.vocabulary().recognize(descriptor, input) {
            Recognition::NotUnderstood(fragment) => {
                let shown = if fragment.is_empty() {
                    input.trim()
                } else {
                    fragment.as_str()
                };
                out.push(render(&dialog.templates().not_understood, &[shown]));
                out.push(dialog.field_prompt(field)?);
                Ok(())
            }
            Recognition::NoPreference => self.accept(dialog, field, None, out),
            Recognition::Value(value) => {
                self.record.stage(&descriptor.name, value.clone())?;
                self.accept(dialog, field, Some(value), out)
            }
        }
    }

    fn accept(
        &mut self,
        dialog: &CompiledDialog,
        field: usize,
        raw: Option<FieldValue>,
        out: &mut Vec<String>,
    ) -> Result<(), FormError> {
        let name = dialog.field_at(field)?.name.as_str();
        let staged = raw.is_some();
        match dialog.validate(&self.record, name, raw)? {
            ValidationResult::Accepted(value) => {
                match (staged, value) {
                    (true, value) => self.record.confirm(name, value)?,
                    (false, None) => self.record.skip(name)?,
                    (false, Some(value)) => {
                        self.record.stage(name, value.clone())?;
                        self.record.confirm(name, Some(value))?;
                    }
                }
                tracing::debug!(field = %name, "Field accepted");
                self.history.push(self.cursor);
                self.advance(self.cursor + 1, out)
            }
            ValidationResult::Rejected { reason } => {
                tracing::debug!(field = %name, reason = %reason, "Field rejected");
                self.record.clear(name)?;
                out.push(reason);
                out.push(dialog.field_prompt(field)?);
                Ok(())
            }
        }
    }

    fn answer_confirm(
        &mut self,
        dialog: &CompiledDialog,
        confirm: usize,
        input: &str,
        out: &mut Vec<String>,
    ) -> Result<(), FormError> {
        let step = dialog.confirm_at(confirm)?;
        match dialog.vocabulary().answer(input) {
            Some(true) => {
                self.accepted_confirms.insert(confirm);
                self.history.push(self.cursor);
                self.advance(self.cursor + 1, out)
            }
            Some(false) => {
                tracing::info!(step = %step.name, "Confirm declined");
                self.set_state(DialogState::Cancelled {
                    at: step.name.clone(),
                })
            }
            None => {
                out.push(render(&dialog.templates().not_understood, &[input.trim()]));
                out.push(step.prompt(&self.record)?);
                Ok(())
            }
        }
    }

    fn apply_command(
        &mut self,
        dialog: &CompiledDialog,
        command: Command,
        out: &mut Vec<String>,
    ) -> Result<(), FormError> {
        tracing::debug!(?command, cursor = self.cursor, "Dialog command");
        match command {
            Command::Quit => {
                let at = dialog.step_name(self.cursor)?.to_string();
                tracing::info!(step = %at, "Dialog quit");
                self.set_state(DialogState::Cancelled { at })
            }
            Command::Back => match self.history.pop() {
                Some(target) => self.reopen(dialog, target, out),
                None => self.reprompt(out),
            },
            Command::Status => {
                out.push(self.summary(dialog));
                self.reprompt(out)
            }
            Command::Help => self.reprompt(out),
        }
    }

    /// Asks an answered step again and invalidates every later confirm.
    ///
    /// The step keeps its value until it is answered again, so stepping
    /// back over a field does not lose it.
    fn reopen(
        &mut self,
        dialog: &CompiledDialog,
        target: usize,
        out: &mut Vec<String>,
    ) -> Result<(), FormError> {
        for step in &dialog.steps()[target..] {
            if let Step::Confirm { confirm } = step {
                self.accepted_confirms.remove(confirm);
            }
        }
        self.cursor = target;
        match dialog.step(target)? {
            Step::Field { field, .. } => {
                self.set_state(DialogState::AwaitingField { field: *field })?
            }
            Step::Confirm { confirm } => {
                self.set_state(DialogState::AwaitingConfirm { confirm: *confirm })?
            }
            Step::Message(_) => return self.advance(target, out),
        }
        self.reprompt(out)
    }

    /// Moves to the first step at or after `from` that still needs input.
    fn advance(&mut self, from: usize, out: &mut Vec<String>) -> Result<(), FormError> {
        let dialog = Arc::clone(&self.dialog);
        let mut index = from;
        while index < dialog.steps().len() {
            match dialog.step(index)? {
                Step::Message(text) => {
                    if self.shown_messages.insert(index) {
                        out.push(text.clone());
                    }
                }
                Step::Field { field, condition } => {
                    let name = dialog.field_at(*field)?.name.as_str();
                    let active = condition
                        .as_ref()
                        .map(|c| c.is_met(&self.record))
                        .unwrap_or(true);
                    if !active {
                        if self.record.slot(name) != Some(&Slot::Unset) {
                            self.record.clear(name)?;
                        }
                    } else if !self.record.is_answered(name) {
                        self.cursor = index;
                        self.set_state(DialogState::AwaitingField { field: *field })?;
                        out.push(dialog.field_prompt(*field)?);
                        return Ok(());
                    }
                }
                Step::Confirm { confirm } => {
                    if !self.accepted_confirms.contains(confirm) {
                        self.cursor = index;
                        self.set_state(DialogState::AwaitingConfirm { confirm: *confirm })?;
                        out.push(dialog.confirm_at(*confirm)?.prompt(&self.record)?);
                        return Ok(());
                    }
                }
            }
            index += 1;
        }
        self.cursor = index;
        tracing::info!(dialog = %dialog.name(), "Dialog completed");
        self.set_state(DialogState::Completed)
    }

    fn reprompt(&self, out: &mut Vec<String>) -> Result<(), FormError> {
        match &self.state {
            DialogState::AwaitingField { field } => out.push(self.dialog.field_prompt(*field)?),
            DialogState::AwaitingConfirm { confirm } => {
                out.push(self.dialog.confirm_at(*confirm)?.prompt(&self.record)?)
            }
            _ => {}
        }
        Ok(())
    }

    fn summary(&self, dialog: &CompiledDialog) -> String {
        let templates = dialog.templates();
        let mut lines = vec![templates.status_header.clone()];
        lines.extend(dialog.fields().iter().map(|field| {
            render_display(
                field,
                self.record.value(&field.name),
                self.record.is_answered(&field.name),
                templates,
            )
        }));
        lines.join("\n")
    }

    fn set_state(&mut self, target: DialogState) -> Result<(), FormError> {
        if self.state != target {
            self.state = self.state.transition_to(target)?;
        }
        Ok(())
    }
}
