//! Locale cache of compiled dialogs.
//!
//! `LocaleFormCache::get_or_build` compiles at most one dialog per locale
//! and hands out the same `Arc<CompiledDialog>` on every later call.
//! Compilation runs outside the lock; when two first requests race, the
//! entry inserted first wins and the other result is dropped, so every
//! caller observes a single dialog per locale.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::form::{
    CompiledDialog, CompletionCallback, FormBuilder, FormTemplates, SchemaDocument, SchemaError,
};
use crate::domain::foundation::{Locale, Timestamp};
use crate::domain::order::{order_form_builder, OrderTexts};
use crate::ports::{Localizer, SchemaSource};

/// Produces the completion callback of the dialog compiled for a locale.
pub type CallbackProvider = Arc<dyn Fn(&Locale) -> Arc<dyn CompletionCallback> + Send + Sync>;

/// Builds the dialog for one locale.
#[async_trait]
pub trait FormFactory: Send + Sync {
    async fn build(&self, locale: &Locale) -> Result<CompiledDialog, SchemaError>;
}

fn localized_templates(
    localizer: &dyn Localizer,
    locale: &Locale,
) -> Result<FormTemplates, SchemaError> {
    FormTemplates::from_lookup(|id| lookup(localizer, locale, id))
}

fn lookup(localizer: &dyn Localizer, locale: &Locale, id: &str) -> Result<String, SchemaError> {
    localizer
        .lookup(locale, id, &[])
        .map_err(|e| SchemaError::MissingTemplate {
            template_id: id.to_string(),
            reason: e.to_string(),
        })
}

fn finish(
    builder: FormBuilder,
    locale: &Locale,
    templates: FormTemplates,
    on_completion: &Option<CallbackProvider>,
) -> Result<CompiledDialog, SchemaError> {
    let builder = builder.locale(locale.clone()).templates(templates);
    match on_completion {
        Some(provide) => builder.on_completion(provide(locale)),
        None => builder,
    }
    .build()
}

/// Compiles the static Stardust order with localized texts.
pub struct StaticOrderFormFactory {
    localizer: Arc<dyn Localizer>,
    on_completion: Option<CallbackProvider>,
}

impl StaticOrderFormFactory {
    pub fn new(
        localizer: Arc<dyn Localizer>,
        on_completion: Option<CallbackProvider>,
    ) -> Self {
        Self {
            localizer,
            on_completion,
        }
    }
}

#[async_trait]
impl FormFactory for StaticOrderFormFactory {
    async fn build(&self, locale: &Locale) -> Result<CompiledDialog, SchemaError> {
        let localizer = self.localizer.as_ref();
        let texts = OrderTexts::from_lookup(|id| lookup(localizer, locale, id))?;
        let templates = localized_templates(localizer, locale)?;
        finish(order_form_builder(&texts)?, locale, templates, &self.on_completion)
    }
}

/// Compiles a dialog from a schema document loaded on each build.
pub struct SchemaFormFactory {
    source: Arc<dyn SchemaSource>,
    localizer: Arc<dyn Localizer>,
    on_completion: Option<CallbackProvider>,
}

impl SchemaFormFactory {
    pub fn new(
        source: Arc<dyn SchemaSource>,
        localizer: Arc<dyn Localizer>,
        on_completion: Option<CallbackProvider>,
    ) -> Self {
        Self {
            source,
            localizer,
            on_completion,
        }
    }
}

#[async_trait]
impl FormFactory for SchemaFormFactory {
    async fn build(&self, locale: &Locale) -> Result<CompiledDialog, SchemaError> {
        let text = self
            .source
            .load()
            .await
            .map_err(|e| SchemaError::Source(e.to_string()))?;
        let document = SchemaDocument::parse(&text.content, text.format)?;
        let templates = localized_templates(self.localizer.as_ref(), locale)?;
        finish(
            FormBuilder::from_schema(&document)?,
            locale,
            templates,
            &self.on_completion,
        )
    }
}

/// Expiry and size limits of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entry lifetime in seconds; `None` keeps entries forever.
    pub ttl_secs: Option<u64>,
    /// Maximum number of locales; the oldest entry is evicted past it.
    pub max_locales: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl_secs: None,
            max_locales: 32,
        }
    }
}

struct CacheEntry {
    dialog: Arc<CompiledDialog>,
    built_at: Timestamp,
}

/// Read-through cache of compiled dialogs keyed by locale.
pub struct LocaleFormCache {
    factory: Arc<dyn FormFactory>,
    policy: CachePolicy,
    entries: RwLock<HashMap<Locale, CacheEntry>>,
}

impl LocaleFormCache {
    pub fn new(factory: Arc<dyn FormFactory>, policy: CachePolicy) -> Self {
        Self {
            factory,
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the dialog for `locale`, compiling it on first use.
    ///
    /// A failed compilation is returned to the caller and leaves the
    /// cache untouched.
    pub async fn get_or_build(&self, locale: &Locale) -> Result<Arc<CompiledDialog>, SchemaError> {
        if let Some(dialog) = self.fresh(locale).await {
            return Ok(dialog);
        }

        let built = match self.factory.build(locale).await {
            Ok(dialog) => Arc::new(dialog),
            Err(err) => {
                tracing::warn!(locale = %locale, error = %err, "Dialog compilation failed");
                return Err(err);
            }
        };

        let mut entries = self.entries.write().await;
        let now = Timestamp::now();
        if let Some(entry) = entries.get(locale) {
            if self.is_fresh(entry, &now) {
                return Ok(Arc::clone(&entry.dialog));
            }
        }
        if !entries.contains_key(locale) && entries.len() >= self.policy.max_locales {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| *entry.built_at.as_datetime())
                .map(|(locale, _)| locale.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(locale = %oldest, "Evicting cached dialog");
                entries.remove(&oldest);
            }
        }
        tracing::info!(locale = %locale, dialog = %built.name(), "Cached compiled dialog");
        entries.insert(
            locale.clone(),
            CacheEntry {
                dialog: Arc::clone(&built),
                built_at: now,
            },
        );
        Ok(built)
    }

    /// Drops the entry for `locale`. Returns true if one existed.
    pub async fn invalidate(&self, locale: &Locale) -> bool {
        self.entries.write().await.remove(locale).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn fresh(&self, locale: &Locale) -> Option<Arc<CompiledDialog>> {
        let entries = self.entries.read().await;
        let now = Timestamp::now();
        entries
            .get(locale)
            .filter(|entry| self.is_fresh(entry, &now))
            .map(|entry| Arc::clone(&entry.dialog))
    }

    fn is_fresh(&self, entry: &CacheEntry, now: &Timestamp) -> bool {
        match self.policy.ttl_secs {
            None => true,
            Some(0) => false,
            Some(ttl) => !entry.built_at.is_older_than(ttl, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{EmbeddedSchemaSource, StaticLocalizer};
    use crate::domain::form::{FieldDescriptor, FieldKind, SchemaFormat};
    use crate::ports::{SchemaSourceError, SchemaText};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFactory {
        builds: AtomicUsize,
        fail: bool,
    }

    impl CountingFactory {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                builds: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl FormFactory for CountingFactory {
        async fn build(&self, locale: &Locale) -> Result<CompiledDialog, SchemaError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                return Err(SchemaError::Empty(locale.to_string()));
            }
            FormBuilder::new("Tiny")
                .declare(FieldDescriptor::new("Name", FieldKind::Text { pattern: None }))
                .locale(locale.clone())
                .build()
        }
    }

    struct BrokenSchema;

    #[async_trait]
    impl SchemaSource for BrokenSchema {
        async fn load(&self) -> Result<SchemaText, SchemaSourceError> {
            Ok(SchemaText {
                content: r#"{"name": "X", "fields": [{"name": "Syrup", "type": "colour"}]}"#
                    .to_string(),
                format: SchemaFormat::Json,
            })
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    #[tokio::test]
    async fn second_lookup_returns_same_instance() {
        let factory = CountingFactory::new(false);
        let cache = LocaleFormCache::new(factory.clone(), CachePolicy::default());

        let first = cache.get_or_build(&locale("en")).await.unwrap();
        let second = cache.get_or_build(&locale("en")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn locales_get_separate_dialogs() {
        let cache = LocaleFormCache::new(CountingFactory::new(false), CachePolicy::default());
        let en = cache.get_or_build(&locale("en")).await.unwrap();
        let fr = cache.get_or_build(&locale("fr")).await.unwrap();
        assert!(!Arc::ptr_eq(&en, &fr));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn failed_build_is_not_cached() {
        let factory = CountingFactory::new(true);
        let cache = LocaleFormCache::new(factory.clone(), CachePolicy::default());

        assert!(cache.get_or_build(&locale("en")).await.is_err());
        assert!(cache.get_or_build(&locale("en")).await.is_err());
        assert!(cache.is_empty().await);
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_schema_type_is_not_cached() {
        let factory = SchemaFormFactory::new(
            Arc::new(BrokenSchema),
            Arc::new(StaticLocalizer::default()),
            None,
        );
        let cache = LocaleFormCache::new(Arc::new(factory), CachePolicy::default());
        let err = cache.get_or_build(&locale("en")).await.unwrap_err();
        assert!(matches!(err, SchemaError::UnknownFieldType { .. }));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_first_requests_converge() {
        let cache = Arc::new(LocaleFormCache::new(
            CountingFactory::new(false),
            CachePolicy::default(),
        ));
        let lookups = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            async move { cache.get_or_build(&locale("fr")).await.unwrap() }
        });
        let dialogs = futures::future::join_all(lookups).await;

        let cached = cache.get_or_build(&locale("fr")).await.unwrap();
        assert!(dialogs.iter().all(|d| Arc::ptr_eq(d, &cached)));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn zero_ttl_rebuilds_every_time() {
        let factory = CountingFactory::new(false);
        let cache = LocaleFormCache::new(
            factory.clone(),
            CachePolicy {
                ttl_secs: Some(0),
                max_locales: 4,
            },
        );
        cache.get_or_build(&locale("en")).await.unwrap();
        cache.get_or_build(&locale("en")).await.unwrap();
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn ttl_beyond_duration_range_never_expires() {
        for ttl in [10_000_000_000_000_000, u64::MAX] {
            let factory = CountingFactory::new(false);
            let cache = LocaleFormCache::new(
                factory.clone(),
                CachePolicy {
                    ttl_secs: Some(ttl),
                    max_locales: 4,
                },
            );
            let first = cache.get_or_build(&locale("en")).await.unwrap();
            let second = cache.get_or_build(&locale("en")).await.unwrap();
            assert!(Arc::ptr_eq(&first, &second), "ttl {ttl} rebuilt the dialog");
            assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn oldest_locale_is_evicted_past_the_limit() {
        let cache = LocaleFormCache::new(
            CountingFactory::new(false),
            CachePolicy {
                ttl_secs: None,
                max_locales: 2,
            },
        );
        cache.get_or_build(&locale("en")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        cache.get_or_build(&locale("fr")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        cache.get_or_build(&locale("de")).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(!cache.invalidate(&locale("en")).await);
        assert!(cache.invalidate(&locale("de")).await);
    }

    #[tokio::test]
    async fn static_and_schema_factories_compile_for_french() {
        let localizer: Arc<dyn Localizer> = Arc::new(StaticLocalizer::default());
        let fr = locale("fr");

        let static_dialog = StaticOrderFormFactory::new(localizer.clone(), None)
            .build(&fr)
            .await
            .unwrap();
        assert_eq!(static_dialog.locale(), Some(&fr));
        assert_eq!(static_dialog.templates().no_preference, "Aucun");

        let schema_dialog =
            SchemaFormFactory::new(Arc::new(EmbeddedSchemaSource::default()), localizer, None)
                .build(&fr)
                .await
                .unwrap();
        assert_eq!(schema_dialog.templates().no_preference, "Aucun");
    }
}
