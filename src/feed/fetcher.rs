use crate::config::FetchSettings;
use crate::error::{Error, Result};
use crate::feed::aggregator::aggregate;
use crate::feed::parser::FeedParser;
use crate::feed::{Article, FeedSource, ParsedFeed};
use chrono::Utc;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    timeout_duration: Duration,
    user_agent: String,
    max_items: usize,
}

impl FeedFetcher {
    pub fn new() -> Result<Self> {
        Self::from_settings(&FetchSettings::default())
    }

    pub fn from_settings(settings: &FetchSettings) -> Result<Self> {
        let timeout_duration = Duration::from_secs(settings.timeout_secs);
        let client = Client::builder()
            .timeout(timeout_duration)
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_duration,
            user_agent: settings.user_agent.clone(),
            max_items: settings.max_items_per_source,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_duration = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed> {
        debug!("Fetching feed from: {}", url);

        let parser = FeedParser::new();
        parser.validate_feed_url(url)?;

        let response = timeout(self.timeout_duration, self.fetch_response(url))
            .await
            .map_err(|_| Error::Timeout(format!("Request to {} timed out", url)))??;

        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "HTTP {} for {}: {}",
                response.status().as_u16(),
                url,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let content = timeout(self.timeout_duration, response.bytes())
            .await
            .map_err(|_| Error::Timeout(format!("Reading body of {} timed out", url)))?
            .map_err(|e| Error::HttpError(format!("Failed to read response body: {}", e)))?;

        debug!("Downloaded {} bytes from {}", content.len(), url);

        parser.parse_feed(std::io::Cursor::new(content))
    }

    async fn fetch_response(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/rss+xml, application/rdf+xml, application/atom+xml, application/xml, text/xml, */*")
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("Request failed: {}", e)))?;

        Ok(response)
    }

    /// Fetch one source. Failures are logged and yield no articles.
    pub async fn fetch_source(&self, source: &FeedSource) -> Vec<Article> {
        debug!("Fetching: {}", source.name);

        let parsed = match self.fetch_feed(&source.feed_url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(source = %source.name, code = e.error_code(), temporary = e.is_temporary(), "Failed to fetch {}: {}", source.name, e);
                return Vec::new();
            }
        };

        let fetched_at = Utc::now();
        let articles: Vec<Article> = parsed
            .articles
            .into_iter()
            .take(self.max_items)
            .filter_map(|entry| Article::from_parsed(entry, source, fetched_at))
            .collect();

        info!(source = %source.name, "{} articles fetched", articles.len());
        articles
    }

    /// Fetch every source concurrently, then dedupe and sort the combined result.
    ///
    /// Concurrency is bounded only by the length of `sources`.
    pub async fn fetch_all(&self, sources: &[FeedSource]) -> Vec<Article> {
        let futures = sources.iter().map(|source| self.fetch_source(source));
        let per_source = futures::future::join_all(futures).await;

        let combined: Vec<Article> = per_source.into_iter().flatten().collect();
        let total = combined.len();
        let articles = aggregate(combined);

        info!("Aggregated {} articles ({} duplicates removed)", articles.len(), total - articles.len());
        articles
    }
}
