//! State machine trait for lifecycle enums.

use super::ValidationError;

/// Trait for state enums whose transitions are validated.
///
/// Implementors describe which moves are legal and get a checked
/// `transition_to` for free.
///
/// ```ignore
/// let next = state.transition_to(DialogState::Completed)?;
/// ```
pub trait StateMachine: Sized + Clone + PartialEq + std::fmt::Debug {
    /// Returns true if a transition from self to target is legal.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns true if no transition leaves this state.
    fn is_terminal(&self) -> bool;

    /// Performs the transition, returning an error if it is not legal.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, &target))
        }
    }
}
