//! Integration tests for the static Stardust order dialog.
//!
//! Full conversations are driven through `OrderConversationHandler` with
//! the built-in localizer and an in-memory order processor.

use serde_json::json;
use std::sync::Arc;

use stardust_bot::adapters::{InMemoryOrderProcessor, StaticLocalizer};
use stardust_bot::application::{
    CachePolicy, CallbackProvider, CompletionHandler, HandleMessageCommand, LocaleFormCache,
    OrderConversationHandler, ProcessOrderCallback, StaticOrderFormFactory,
};
use stardust_bot::domain::form::{CompletionCallback, DialogState};
use stardust_bot::domain::foundation::{ConversationId, Locale};
use stardust_bot::ports::Localizer;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Bot {
    handler: OrderConversationHandler,
    cache: Arc<LocaleFormCache>,
    processor: Arc<InMemoryOrderProcessor>,
}

impl Bot {
    fn new() -> Self {
        let processor = Arc::new(InMemoryOrderProcessor::new());
        let localizer: Arc<dyn Localizer> = Arc::new(StaticLocalizer::default());

        let callback_processor = Arc::clone(&processor);
        let callback_localizer = Arc::clone(&localizer);
        let provider: CallbackProvider = Arc::new(move |locale: &Locale| {
            let callback: Arc<dyn CompletionCallback> = Arc::new(ProcessOrderCallback::new(
                callback_processor.clone(),
                callback_localizer.clone(),
                locale.clone(),
            ));
            callback
        });

        let factory = StaticOrderFormFactory::new(Arc::clone(&localizer), Some(provider));
        let cache = Arc::new(LocaleFormCache::new(
            Arc::new(factory),
            CachePolicy::default(),
        ));
        let handler =
            OrderConversationHandler::new(Arc::clone(&cache), CompletionHandler::new(localizer));
        Self {
            handler,
            cache,
            processor,
        }
    }

    async fn say(&self, id: ConversationId, locale: &str, text: &str) -> (Vec<String>, DialogState) {
        let result = self
            .handler
            .handle(HandleMessageCommand {
                conversation_id: id,
                locale: Locale::parse(locale).unwrap(),
                text: text.to_string(),
            })
            .await
            .unwrap();
        (result.replies, result.state)
    }

    /// Sends every message and returns the replies to the last one.
    async fn conversation(&self, id: ConversationId, inputs: &[&str]) -> (Vec<String>, DialogState) {
        let mut last = (Vec::new(), DialogState::initial());
        for input in inputs {
            last = self.say(id, "en", input).await;
        }
        last
    }
}

const UP_TO_COST: &[&str] = &["hi", "mocha", "hot", "short", "none", "everything but milk"];

// =============================================================================
// Full conversations
// =============================================================================

#[tokio::test]
async fn full_order_is_processed_once() {
    let bot = Bot::new();
    let id = ConversationId::new();

    let (replies, state) = bot.conversation(id, UP_TO_COST).await;
    assert_eq!(state, DialogState::AwaitingConfirm { confirm: 0 });
    assert_eq!(replies, vec!["Total for your coffee is $3.49. Is that ok?"]);

    let (replies, _) = bot.say(id, "en", "yes").await;
    assert_eq!(
        replies,
        vec!["Do you want to order a short hot mocha with cream, vanilla, chocolate, caramel?"]
    );

    let (replies, state) = bot
        .conversation(
            id,
            &["yes", "Ada", "1 Stardust Way", "(555) 123-4567", "skip", "5"],
        )
        .await;

    assert_eq!(state, DialogState::Completed);
    assert_eq!(
        replies,
        vec![
            "Thanks for your order!",
            "We are processing your order...",
            "Your order has been processed. Enjoy!",
        ]
    );
    assert_eq!(
        bot.processor.orders(),
        vec![json!({
            "Coffee": "Mocha",
            "Temperature": "Hot",
            "Size": "Short",
            "Toppings": ["Cream", "Vanilla", "Chocolate", "Caramel"],
            "Sugar": null,
            "Name": "Ada",
            "DeliveryAddress": "1 Stardust Way",
            "PhoneNumber": "(555) 123-4567",
            "DeliveryTime": null,
            "Rating": 5.0,
        })]
    );
    assert_eq!(bot.handler.active_sessions().await, 0);
}

#[tokio::test]
async fn invalid_phone_number_is_asked_again() {
    let bot = Bot::new();
    let id = ConversationId::new();
    bot.conversation(id, UP_TO_COST).await;

    let (replies, state) = bot
        .conversation(id, &["yes", "yes", "Ada", "1 Stardust Way", "call me maybe"])
        .await;

    assert!(state.accepts_input());
    assert_eq!(replies.len(), 2);
    assert!(replies[0].contains("call me maybe"));
    assert_eq!(replies[1], "Please enter your phone number.");
}

#[tokio::test]
async fn price_is_recomputed_after_going_back_to_size() {
    let bot = Bot::new();
    let id = ConversationId::new();
    bot.conversation(id, UP_TO_COST).await;

    let (replies, _) = bot.conversation(id, &["back", "back", "back"]).await;
    assert!(replies[0].starts_with("What size do you want?"));

    let (replies, state) = bot.say(id, "en", "big").await;
    assert_eq!(state, DialogState::AwaitingConfirm { confirm: 0 });
    assert_eq!(replies, vec!["Total for your coffee is $8.99. Is that ok?"]);
}

#[tokio::test]
async fn declining_order_confirm_cancels_at_order() {
    let bot = Bot::new();
    let id = ConversationId::new();
    bot.conversation(id, UP_TO_COST).await;

    let (replies, state) = bot.conversation(id, &["yes", "no"]).await;

    assert_eq!(
        state,
        DialogState::Cancelled {
            at: "Order".to_string()
        }
    );
    assert_eq!(
        replies,
        vec!["You quit on order confirmation--maybe you can finish next time!"]
    );
    assert!(bot.processor.is_empty());
}

#[tokio::test]
async fn order_confirm_without_extras_has_no_second_part() {
    let bot = Bot::new();
    let id = ConversationId::new();

    let (replies, _) = bot
        .conversation(id, &["hi", "2", "cold", "long", "none", "none", "yes"])
        .await;

    assert_eq!(
        replies,
        vec!["Do you want to order a long cold caramel macchiato?"]
    );
}

#[tokio::test]
async fn processing_failure_gets_apology_and_closes_session() {
    let bot = Bot::new();
    bot.processor.set_failing(true);
    let id = ConversationId::new();
    bot.conversation(id, UP_TO_COST).await;

    let (replies, state) = bot
        .conversation(
            id,
            &["yes", "yes", "Ada", "1 Stardust Way", "555 1234", "none", "none"],
        )
        .await;

    assert_eq!(state, DialogState::Completed);
    assert_eq!(
        replies.last().map(String::as_str),
        Some("Sorry, I've had a short circuit.  Please try again.")
    );
    assert_eq!(bot.handler.active_sessions().await, 0);
}

// =============================================================================
// Sessions and cache
// =============================================================================

#[tokio::test]
async fn concurrent_conversations_are_independent() {
    let bot = Arc::new(Bot::new());
    let first = ConversationId::new();
    let second = ConversationId::new();

    let run = |id: ConversationId, size: &'static str| {
        let bot = Arc::clone(&bot);
        async move {
            bot.conversation(id, &["hi", "tea", "hot", size, "none", "none"])
                .await
        }
    };
    let (a, b) = tokio::join!(run(first, "ristretto"), run(second, "medium"));

    assert_eq!(a.0, vec!["Total for your coffee is $2.00. Is that ok?"]);
    assert_eq!(b.0, vec!["Total for your coffee is $5.00. Is that ok?"]);
    assert_eq!(bot.handler.active_sessions().await, 2);
}

#[tokio::test]
async fn sessions_share_one_compiled_dialog_per_locale() {
    let bot = Bot::new();
    bot.say(ConversationId::new(), "en", "hi").await;
    bot.say(ConversationId::new(), "en", "hi").await;
    let (replies, _) = bot.say(ConversationId::new(), "fr", "salut").await;

    assert!(replies[0].starts_with("Bienvenue chez Stardust coffee"));
    assert_eq!(bot.cache.len().await, 2);

    let en = Locale::parse("en").unwrap();
    let first = bot.cache.get_or_build(&en).await.unwrap();
    let second = bot.cache.get_or_build(&en).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn french_cancellation_names_the_step() {
    let bot = Bot::new();
    let id = ConversationId::new();
    bot.say(id, "fr", "salut").await;

    let (replies, _) = bot.say(id, "fr", "annuler").await;

    assert_eq!(
        replies,
        vec!["Vous avez abandonné à l'étape café. Vous pourrez terminer la prochaine fois !"]
    );
}

#[tokio::test]
async fn french_price_refusal_names_the_confirmation() {
    let bot = Bot::new();
    let id = ConversationId::new();
    for input in ["salut", "mocha", "hot", "short", "aucun", "everything but milk"] {
        bot.say(id, "fr", input).await;
    }

    let (replies, state) = bot.say(id, "fr", "non").await;

    assert_eq!(
        state,
        DialogState::Cancelled {
            at: "Cost".to_string()
        }
    );
    assert_eq!(
        replies,
        vec!["Vous avez abandonné à l'étape confirmation du prix. Vous pourrez terminer la prochaine fois !"]
    );
}
