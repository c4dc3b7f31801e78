//! Application handlers.
//!
//! Message routing into dialog sessions and the closing replies of
//! finished dialogs.

pub mod completion;
pub mod handle_message;

pub use completion::{CompletionHandler, ProcessOrderCallback};
pub use handle_message::{
    HandleMessageCommand, HandleMessageError, HandleMessageResult, OrderConversationHandler,
};
