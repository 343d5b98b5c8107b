use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::TranslatorSettings;
use crate::error::{Error, Result};
use crate::feed::Article;
use crate::storage::{CacheEntry, CacheStore, TranslationCache};
use crate::translation::classifier::{is_translation_candidate, Classifier};
use crate::translation::client::{ChatCompletionBackend, TranslationBackend};
use crate::translation::response::ResponseParser;

/// What happened to a single article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// Not a translation candidate; passed through.
    Skipped,
    /// Served from the translation cache without a request.
    CacheHit,
    /// Translated by the backend and written to the cache.
    Translated,
    /// Request or parsing failed; the original article was kept.
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub translated: usize,
    pub cache_hits: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TranslationReport {
    fn record(&mut self, outcome: &TranslationOutcome) {
        match outcome {
            TranslationOutcome::Skipped => self.skipped += 1,
            TranslationOutcome::CacheHit => self.cache_hits += 1,
            TranslationOutcome::Translated => self.translated += 1,
            TranslationOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.translated + self.cache_hits + self.failed + self.skipped
    }
}

/// Cache-backed, bounded-concurrency translator for a batch of articles.
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
    store: Arc<dyn CacheStore>,
    classifier: Classifier,
    parser: ResponseParser,
    max_concurrent: usize,
}

/// State shared by every per-article task of one batch.
struct BatchContext {
    backend: Arc<dyn TranslationBackend>,
    classifier: Classifier,
    parser: ResponseParser,
    limiter: Semaphore,
    cache: Mutex<TranslationCache>,
}

impl Translator {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        store: Arc<dyn CacheStore>,
        max_concurrent: usize,
    ) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(Error::Config("max_concurrent must be greater than 0".to_string()));
        }

        Ok(Self {
            backend,
            store,
            classifier: is_translation_candidate,
            parser: ResponseParser::new()?,
            max_concurrent,
        })
    }

    /// Translator talking to the configured chat-completion endpoint.
    pub fn from_settings(settings: &TranslatorSettings, store: Arc<dyn CacheStore>) -> Result<Self> {
        let backend = Arc::new(ChatCompletionBackend::new(settings)?);
        Self::new(backend, store, settings.max_concurrent)
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Translate every candidate article. Output order and links match the input.
    ///
    /// The cache is loaded before the first request and saved once after every
    /// article has resolved. Nothing in here fails the batch.
    pub async fn translate(&self, articles: Vec<Article>) -> (Vec<Article>, TranslationReport) {
        let cache = self.load_cache().await;
        let context = Arc::new(BatchContext {
            backend: Arc::clone(&self.backend),
            classifier: self.classifier,
            parser: self.parser.clone(),
            limiter: Semaphore::new(self.max_concurrent),
            cache: Mutex::new(cache),
        });

        let handles: Vec<_> = articles
            .iter()
            .cloned()
            .map(|article| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { context.translate_one(article).await })
            })
            .collect();

        let mut report = TranslationReport::default();
        let results = join_all(handles).await;
        let translated: Vec<Article> = results
            .into_iter()
            .zip(articles)
            .map(|(joined, original)| match joined {
                Ok((article, outcome)) => {
                    report.record(&outcome);
                    article
                }
                Err(e) => {
                    warn!("Translation task for {} aborted: {}", original.title, e);
                    report.record(&TranslationOutcome::Failed(e.to_string()));
                    original
                }
            })
            .collect();

        let cache = context.cache.lock().clone();
        self.save_cache(&cache).await;

        info!(
            "{} articles translated ({} from cache, {} failed, {} skipped)",
            report.translated, report.cache_hits, report.failed, report.skipped
        );
        (translated, report)
    }

    async fn load_cache(&self) -> TranslationCache {
        match self.store.load().await {
            Ok(Some(cache)) => cache,
            Ok(None) => {
                warn!("No translation cache at {}, starting empty", self.store.location());
                TranslationCache::new()
            }
            Err(e) => {
                warn!("Failed to load translation cache from {}: {}", self.store.location(), e);
                TranslationCache::new()
            }
        }
    }

    async fn save_cache(&self, cache: &TranslationCache) {
        if let Err(e) = self.store.save(cache).await {
            warn!("Failed to save translation cache to {}: {}", self.store.location(), e);
        }
    }
}

impl BatchContext {
    async fn translate_one(&self, article: Article) -> (Article, TranslationOutcome) {
        if !(self.classifier)(&article.classification_text()) {
            return (article, TranslationOutcome::Skipped);
        }

        let cached = self.cache.lock().get(&article.link).cloned();
        if let Some(entry) = cached {
            debug!("Cache hit for {}", article.link);
            return (article.with_text(entry.title, entry.content), TranslationOutcome::CacheHit);
        }

        match self.request(&article).await {
            Ok((title, content)) => {
                self.cache
                    .lock()
                    .insert(article.link.clone(), CacheEntry::new(title.clone(), content.clone()));
                (article.with_text(title, content), TranslationOutcome::Translated)
            }
            Err(e) => {
                warn!(code = e.error_code(), "Translation failed for: {}: {}", article.title, e);
                let cause = e.to_string();
                (article, TranslationOutcome::Failed(cause))
            }
        }
    }

    async fn request(&self, article: &Article) -> Result<(String, String)> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| Error::Translation(format!("Concurrency limiter closed: {}", e)))?;

        let reply = self.backend.complete(&article.title, &article.content).await?;
        let parsed = self.parser.parse(&reply)?;
        Ok(parsed.or_original(&article.title, &article.content))
    }
}
