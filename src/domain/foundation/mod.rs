//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types shared by the
//! dialog engine and the order declaration.

mod errors;
mod ids;
mod locale;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::ConversationId;
pub use locale::Locale;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
