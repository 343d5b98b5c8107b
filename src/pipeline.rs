use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::{Config, SiteSettings};
use crate::error::Result;
use crate::feed::fetcher::FeedFetcher;
use crate::feed::{Article, FeedSource};
use crate::output::SiteWriter;
use crate::storage::{CacheStore, JsonFileStore, MemoryStore};
use crate::translation::{TranslationReport, Translator};

/// Per-run switches, set from the command line.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Translate English articles when a gateway is configured.
    pub translate: bool,
    /// Use the on-disk translation cache instead of a throwaway in-memory one.
    pub use_cache: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            translate: true,
            use_cache: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Final, deduplicated, newest-first articles.
    pub articles: Vec<Article>,
    /// `None` when translation did not run.
    pub translation: Option<TranslationReport>,
    pub written: Vec<PathBuf>,
}

/// fetch -> aggregate -> translate -> publish.
pub struct Pipeline {
    fetcher: FeedFetcher,
    translator: Option<Translator>,
    writer: SiteWriter,
    site: SiteSettings,
}

impl Pipeline {
    pub fn new(fetcher: FeedFetcher, translator: Option<Translator>, writer: SiteWriter, site: SiteSettings) -> Self {
        Self {
            fetcher,
            translator,
            writer,
            site,
        }
    }

    pub fn from_config(config: &Config, options: RunOptions) -> Result<Self> {
        let fetcher = FeedFetcher::from_settings(&config.fetch)?;

        let translator = if !options.translate {
            info!("Translation disabled for this run");
            None
        } else if !config.translator.is_enabled() {
            info!("LLM_GATEWAY_API_KEY or LLM_GATEWAY_BASE_URL not set, skipping translation");
            None
        } else {
            let store: Arc<dyn CacheStore> = if options.use_cache {
                Arc::new(JsonFileStore::new(&config.translator.cache_file))
            } else {
                Arc::new(MemoryStore::new())
            };
            Some(Translator::from_settings(&config.translator, store)?)
        };

        Ok(Self::new(
            fetcher,
            translator,
            SiteWriter::new(&config.output.dir),
            config.site.clone(),
        ))
    }

    pub fn translates(&self) -> bool {
        self.translator.is_some()
    }

    /// Run one batch. Only output errors are fatal.
    pub async fn run(&self, sources: &[FeedSource]) -> Result<RunOutput> {
        let started = Instant::now();

        info!("Fetching {} feeds", sources.len());
        let articles = self.fetcher.fetch_all(sources).await;
        info!("Total articles: {}", articles.len());

        let (articles, translation) = match &self.translator {
            Some(translator) => {
                info!("Translating English articles");
                let (articles, report) = translator.translate(articles).await;
                (articles, Some(report))
            }
            None => (articles, None),
        };

        let written = self.writer.publish(&articles, sources, &self.site).await?;

        info!(
            "Feed generation completed in {:.2}s: {} articles, {} files",
            started.elapsed().as_secs_f64(),
            articles.len(),
            written.len()
        );

        Ok(RunOutput {
            articles,
            translation,
            written,
        })
    }
}
