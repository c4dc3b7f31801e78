//! Console transport for the Stardust coffee bot.
//!
//! Reads one message per line from stdin and prints the bot's replies.
//! An optional first argument selects the locale (`stardust-bot fr`).

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use stardust_bot::adapters::{
    EmbeddedSchemaSource, FileSchemaSource, LoggingOrderProcessor, StaticLocalizer,
};
use stardust_bot::application::{
    CallbackProvider, CompletionHandler, FormFactory, HandleMessageCommand, LocaleFormCache,
    OrderConversationHandler, ProcessOrderCallback, SchemaFormFactory, StaticOrderFormFactory,
};
use stardust_bot::config::{AppConfig, FormSource, LoggingConfig};
use stardust_bot::domain::form::CompletionCallback;
use stardust_bot::domain::foundation::{ConversationId, Locale};
use stardust_bot::ports::{Localizer, OrderProcessor, SchemaSource};

/// Longest pause between two idle-session sweeps.
const REAP_PERIOD_CAP_SECS: u64 = 3600;

fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so they never interleave with the conversation.
    if config.json {
        let _ = tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

fn build_factory(
    config: &AppConfig,
    localizer: Arc<dyn Localizer>,
    processor: Arc<dyn OrderProcessor>,
) -> Arc<dyn FormFactory> {
    let callback_localizer = Arc::clone(&localizer);
    let provider: CallbackProvider = Arc::new(move |locale: &Locale| {
        let callback: Arc<dyn CompletionCallback> = Arc::new(ProcessOrderCallback::new(
            Arc::clone(&processor),
            Arc::clone(&callback_localizer),
            locale.clone(),
        ));
        callback
    });

    match config.dialog.form_source {
        FormSource::Static => Arc::new(StaticOrderFormFactory::new(localizer, Some(provider))),
        FormSource::Schema => {
            let source: Arc<dyn SchemaSource> = match &config.dialog.schema_path {
                Some(path) => Arc::new(FileSchemaSource::new(path)),
                None => Arc::new(EmbeddedSchemaSource::default()),
            };
            tracing::info!(source = %source.describe(), "Compiling dialog from schema");
            Arc::new(SchemaFormFactory::new(source, localizer, Some(provider)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging);

    let default_locale = config.dialog.locale()?;
    let locale = match std::env::args().nth(1) {
        Some(tag) => Locale::parse(&tag)?,
        None => default_locale.clone(),
    };

    let localizer: Arc<dyn Localizer> = Arc::new(StaticLocalizer::new(default_locale));
    let processor: Arc<dyn OrderProcessor> = Arc::new(LoggingOrderProcessor::new());
    let factory = build_factory(&config, Arc::clone(&localizer), processor);
    let cache = Arc::new(LocaleFormCache::new(factory, config.cache.policy()));
    let handler = Arc::new(OrderConversationHandler::new(
        cache,
        CompletionHandler::new(localizer),
    ));

    let idle_secs = config.session.idle_timeout_secs;
    let reaper = {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let period = Duration::from_secs(idle_secs.min(REAP_PERIOD_CAP_SECS));
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                handler.reap_idle(idle_secs).await;
            }
        })
    };

    let conversation_id = ConversationId::new();
    tracing::info!(conversation_id = %conversation_id, locale = %locale, "Console conversation started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut text = String::new();
    loop {
        let result = handler
            .handle(HandleMessageCommand {
                conversation_id,
                locale: locale.clone(),
                text: std::mem::take(&mut text),
            })
            .await?;
        for reply in &result.replies {
            println!("{}", reply);
        }
        if !result.state.accepts_input() {
            break;
        }
        match lines.next_line().await? {
            Some(line) => text = line,
            None => break,
        }
    }

    reaper.abort();
    Ok(())
}
