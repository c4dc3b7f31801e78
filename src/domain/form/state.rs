//! Dialog runtime states.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a session stands in its compiled dialog.
///
/// - `AwaitingField(i)`: asking the i-th declared field
/// - `AwaitingConfirm(j)`: asking the j-th confirm step
/// - `Completed`: every step passed, completion callback invoked
/// - `Cancelled { at }`: the user quit or declined at step `at`
/// - `Faulted`: an internal error ended the turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogState {
    AwaitingField { field: usize },
    AwaitingConfirm { confirm: usize },
    Completed,
    Cancelled { at: String },
    Faulted,
}

impl DialogState {
    /// State of a freshly created session.
    pub fn initial() -> Self {
        DialogState::AwaitingField { field: 0 }
    }

    /// Returns true while the session waits for user input.
    pub fn accepts_input(&self) -> bool {
        matches!(
            self,
            DialogState::AwaitingField { .. } | DialogState::AwaitingConfirm { .. }
        )
    }
}

impl Default for DialogState {
    fn default() -> Self {
        Self::initial()
    }
}

impl StateMachine for DialogState {
    fn can_transition_to(&self, _target: &Self) -> bool {
        // Any waiting state may move anywhere, including back to an
        // earlier field; terminal states never move.
        self.accepts_input()
    }

    fn is_terminal(&self) -> bool {
        !self.accepts_input()
    }
}
