pub mod aggregator;
pub mod fetcher;
pub mod parser;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Site section a source is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Official,
    Vendor,
    Community,
    International,
    Media,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Official,
        Category::Vendor,
        Category::Community,
        Category::International,
        Category::Media,
    ];

    /// Stable identifier, used as feed id and in output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Official => "official",
            Category::Vendor => "vendor",
            Category::Community => "community",
            Category::International => "international",
            Category::Media => "media",
        }
    }

    /// Display label shown on the site.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Official => "公的機関",
            Category::Vendor => "ベンダー",
            Category::Community => "コミュニティ",
            Category::International => "海外情報",
            Category::Media => "国内メディア",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured feed the pipeline polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub homepage_url: String,
    pub feed_url: String,
    pub category: Category,
}

/// Normalized news item. `link` is its identity for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub content: String,
    pub source_name: String,
    pub category: Category,
}

impl Article {
    pub const DEFAULT_TITLE: &'static str = "No Title";

    /// Resolve the defaults for a parsed entry. Returns `None` when the entry has no link.
    pub fn from_parsed(parsed: ParsedArticle, source: &FeedSource, fetched_at: DateTime<Utc>) -> Option<Self> {
        let link = parsed.link.unwrap_or_default();
        if link.is_empty() {
            return None;
        }

        let title = parsed
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_TITLE.to_string());

        let content = parsed
            .snippet
            .filter(|s| !s.is_empty())
            .or(parsed.content)
            .unwrap_or_default();

        Some(Self {
            title,
            link,
            published_at: parsed.published.unwrap_or(fetched_at),
            content,
            source_name: source.name.clone(),
            category: source.category,
        })
    }

    /// Copy of this article with translated text. The link and metadata are kept.
    pub fn with_text(&self, title: String, content: String) -> Self {
        Self {
            title,
            content,
            ..self.clone()
        }
    }

    /// Text the language classifier looks at.
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub last_build_date: Option<DateTime<Utc>>,
    pub articles: Vec<ParsedArticle>,
}

/// Raw entry as delivered by the feed, before defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct ParsedArticle {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Plain-text rendering of the summary, HTML stripped.
    pub snippet: Option<String>,
    /// Raw summary or body as delivered.
    pub content: Option<String>,
    pub published: Option<DateTime<Utc>>,
}
