//! Application layer - Dialog cache and message handlers.
//!
//! This layer wires the dialog engine to its ports: it compiles dialogs
//! per locale, routes messages into sessions and produces closing replies.

pub mod form_cache;
pub mod handlers;

pub use form_cache::{
    CachePolicy, CallbackProvider, FormFactory, LocaleFormCache, SchemaFormFactory,
    StaticOrderFormFactory,
};
pub use handlers::{
    CompletionHandler, HandleMessageCommand, HandleMessageError, HandleMessageResult,
    OrderConversationHandler, ProcessOrderCallback,
};
