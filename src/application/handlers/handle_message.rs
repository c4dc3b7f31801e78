//! OrderConversationHandler - Routes inbound messages to dialog sessions.
//!
//! One `FormSession` lives per conversation. Turns of the same
//! conversation are serialized by the per-session mutex; different
//! conversations run in parallel. Sessions are released as soon as they
//! reach a terminal state, and `reap_idle` drops the ones abandoned by
//! their users.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::form::{DialogState, FormSession, SchemaError};
use crate::domain::foundation::{ConversationId, Locale, Timestamp};

use super::super::form_cache::LocaleFormCache;
use super::completion::CompletionHandler;

/// Command carrying one user message.
#[derive(Debug, Clone)]
pub struct HandleMessageCommand {
    pub conversation_id: ConversationId,
    /// Locale used when this message opens a new session.
    pub locale: Locale,
    pub text: String,
}

/// Replies produced for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleMessageResult {
    pub replies: Vec<String>,
    pub state: DialogState,
}

#[derive(Debug, Error)]
pub enum HandleMessageError {
    #[error("No dialog available for locale '{locale}': {source}")]
    DialogUnavailable {
        locale: Locale,
        #[source]
        source: SchemaError,
    },
}

struct LiveSession {
    session: FormSession,
    last_seen: Timestamp,
}

type SharedSession = Arc<Mutex<LiveSession>>;

/// Handler driving the order dialog for every conversation.
pub struct OrderConversationHandler {
    cache: Arc<LocaleFormCache>,
    completion: CompletionHandler,
    sessions: RwLock<HashMap<ConversationId, SharedSession>>,
}

impl OrderConversationHandler {
    pub fn new(cache: Arc<LocaleFormCache>, completion: CompletionHandler) -> Self {
        Self {
            cache,
            completion,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Runs one turn for the conversation.
    ///
    /// The first message of a conversation opens the dialog and is not
    /// interpreted as an answer.
    pub async fn handle(
        &self,
        cmd: HandleMessageCommand,
    ) -> Result<HandleMessageResult, HandleMessageError> {
        let (mut guard, opened) = self.session_for(&cmd).await?;

        let outcome = if opened {
            guard.session.start().await
        } else {
            guard.session.handle_input(&cmd.text).await
        };
        guard.last_seen = Timestamp::now();

        let mut replies = outcome.messages.clone();
        if guard.session.is_finished() {
            let dialog = guard.session.dialog();
            let locale = dialog.locale().cloned().unwrap_or_else(|| cmd.locale.clone());
            replies.extend(self.completion.closing_messages(dialog, &locale, &outcome));
            drop(guard);
            self.release(&cmd.conversation_id).await;
        }

        tracing::debug!(
            conversation_id = %cmd.conversation_id,
            state = ?outcome.state,
            replies = replies.len(),
            "Handled message"
        );
        Ok(HandleMessageResult {
            replies,
            state: outcome.state,
        })
    }

    /// Drops the session of a conversation. Returns true if one existed.
    pub async fn release(&self, conversation_id: &ConversationId) -> bool {
        let released = self.sessions.write().await.remove(conversation_id).is_some();
        if released {
            tracing::debug!(conversation_id = %conversation_id, "Released session");
        }
        released
    }

    /// Releases sessions idle for more than `idle_secs`.
    ///
    /// Sessions with a turn in flight are kept. Returns the number
    /// released.
    pub async fn reap_idle(&self, idle_secs: u64) -> usize {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, live| match live.try_lock() {
            Ok(guard) => !guard.last_seen.is_older_than(idle_secs, &now),
            Err(_) => true,
        });
        let reaped = before - sessions.len();
        if reaped > 0 {
            tracing::info!(reaped, remaining = sessions.len(), "Reaped idle sessions");
        }
        reaped
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Locks the live session or opens a new one. The flag is true when
    /// this call opened it.
    async fn session_for(
        &self,
        cmd: &HandleMessageCommand,
    ) -> Result<(OwnedMutexGuard<LiveSession>, bool), HandleMessageError> {
        let existing = self
            .sessions
            .read()
            .await
            .get(&cmd.conversation_id)
            .map(Arc::clone);
        if let Some(live) = existing {
            return Ok((live.lock_owned().await, false));
        }

        let dialog = self.cache.get_or_build(&cmd.locale).await.map_err(|source| {
            HandleMessageError::DialogUnavailable {
                locale: cmd.locale.clone(),
                source,
            }
        })?;

        let mut sessions = self.sessions.write().await;
        if let Some(live) = sessions.get(&cmd.conversation_id).map(Arc::clone) {
            drop(sessions);
            return Ok((live.lock_owned().await, false));
        }
        let live = Arc::new(Mutex::new(LiveSession {
            session: FormSession::new(dialog),
            last_seen: Timestamp::now(),
        }));
        // Locked before publication so no other turn runs ahead of start.
        let guard = Arc::clone(&live).lock_owned().await;
        sessions.insert(cmd.conversation_id, live);
        tracing::info!(
            conversation_id = %cmd.conversation_id,
            locale = %cmd.locale,
            "Opened session"
        );
        Ok((guard, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryOrderProcessor, StaticLocalizer};
    use crate::application::form_cache::{
        CachePolicy, CallbackProvider, FormFactory, StaticOrderFormFactory,
    };
    use crate::application::handlers::ProcessOrderCallback;
    use crate::domain::form::{CompiledDialog, CompletionCallback};
    use crate::ports::Localizer;
    use async_trait::async_trait;

    fn en() -> Locale {
        Locale::parse("en").unwrap()
    }

    fn handler_with(processor: Arc<InMemoryOrderProcessor>) -> OrderConversationHandler {
        let localizer: Arc<dyn Localizer> = Arc::new(StaticLocalizer::default());
        let callback_localizer = Arc::clone(&localizer);
        let provider: CallbackProvider = Arc::new(move |locale: &Locale| {
            let callback: Arc<dyn CompletionCallback> = Arc::new(ProcessOrderCallback::new(
                processor.clone(),
                callback_localizer.clone(),
                locale.clone(),
            ));
            callback
        });
        let factory = StaticOrderFormFactory::new(Arc::clone(&localizer), Some(provider));
        let cache = Arc::new(LocaleFormCache::new(Arc::new(factory), CachePolicy::default()));
        OrderConversationHandler::new(cache, CompletionHandler::new(localizer))
    }

    fn message(id: ConversationId, text: &str) -> HandleMessageCommand {
        HandleMessageCommand {
            conversation_id: id,
            locale: en(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn first_message_opens_dialog() {
        let handler = handler_with(Arc::new(InMemoryOrderProcessor::new()));
        let id = ConversationId::new();

        let result = handler.handle(message(id, "hi")).await.unwrap();

        assert_eq!(result.state, DialogState::AwaitingField { field: 0 });
        assert!(result.replies[0].starts_with("Welcome to Stardust coffee!"));
        assert!(result.replies[1].starts_with("What kind of coffee would you like?"));
        assert_eq!(handler.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn quitting_releases_session_with_closing_reply() {
        let handler = handler_with(Arc::new(InMemoryOrderProcessor::new()));
        let id = ConversationId::new();
        handler.handle(message(id, "hi")).await.unwrap();

        let result = handler.handle(message(id, "quit")).await.unwrap();

        assert_eq!(
            result.state,
            DialogState::Cancelled {
                at: "Coffee".to_string()
            }
        );
        assert_eq!(
            result.replies,
            vec!["You quit on coffee--maybe you can finish next time!"]
        );
        assert_eq!(handler.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn next_message_after_release_starts_over() {
        let handler = handler_with(Arc::new(InMemoryOrderProcessor::new()));
        let id = ConversationId::new();
        handler.handle(message(id, "hi")).await.unwrap();
        handler.handle(message(id, "quit")).await.unwrap();

        let result = handler.handle(message(id, "hello again")).await.unwrap();
        assert_eq!(result.state, DialogState::AwaitingField { field: 0 });
    }

    #[tokio::test]
    async fn reap_idle_drops_only_stale_sessions() {
        let handler = handler_with(Arc::new(InMemoryOrderProcessor::new()));
        handler.handle(message(ConversationId::new(), "hi")).await.unwrap();
        handler.handle(message(ConversationId::new(), "hi")).await.unwrap();

        assert_eq!(handler.reap_idle(3600).await, 0);
        assert_eq!(handler.active_sessions().await, 2);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(handler.reap_idle(0).await, 2);
        assert_eq!(handler.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn huge_idle_timeout_keeps_sessions() {
        let handler = handler_with(Arc::new(InMemoryOrderProcessor::new()));
        handler.handle(message(ConversationId::new(), "hi")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert_eq!(handler.reap_idle(u64::MAX).await, 0);
        assert_eq!(handler.reap_idle(10_000_000_000_000_000).await, 0);
        assert_eq!(handler.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn release_of_unknown_conversation_is_false() {
        let handler = handler_with(Arc::new(InMemoryOrderProcessor::new()));
        assert!(!handler.release(&ConversationId::new()).await);
    }

    struct NoDialog;

    #[async_trait]
    impl FormFactory for NoDialog {
        async fn build(&self, locale: &Locale) -> Result<CompiledDialog, SchemaError> {
            Err(SchemaError::Empty(locale.to_string()))
        }
    }

    #[tokio::test]
    async fn compile_failure_is_reported_without_session() {
        let cache = Arc::new(LocaleFormCache::new(Arc::new(NoDialog), CachePolicy::default()));
        let handler = OrderConversationHandler::new(
            cache,
            CompletionHandler::new(Arc::new(StaticLocalizer::default())),
        );

        let err = handler
            .handle(message(ConversationId::new(), "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, HandleMessageError::DialogUnavailable { .. }));
        assert_eq!(handler.active_sessions().await, 0);
    }
}
