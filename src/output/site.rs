use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::feed::{Article, Category, FeedSource};

/// Articles listed on the landing page.
pub const LATEST_ARTICLES: usize = 20;

/// Articles listed per category on the landing page.
pub const ARTICLES_PER_CATEGORY: usize = 10;

/// Row of the client-side paging datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingEntry {
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub source: String,
    pub category: Category,
    pub category_label: &'static str,
}

impl From<&Article> for PagingEntry {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            pub_date: article.published_at,
            source: article.source_name.clone(),
            category: article.category,
            category_label: article.category.label(),
        }
    }
}

pub fn paging_entries(articles: &[Article]) -> Vec<PagingEntry> {
    articles.iter().map(PagingEntry::from).collect()
}

/// Article as shown on the landing page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub content: String,
    pub source: String,
    pub category: Category,
    pub category_label: &'static str,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            pub_date: article.published_at,
            content: article.content.clone(),
            source: article.source_name.clone(),
            category: article.category,
            category_label: article.category.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: Category,
    pub label: &'static str,
    pub article_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub name: String,
    pub homepage_url: String,
    pub feed_url: String,
    pub category: Category,
    pub category_label: &'static str,
}

/// Data file consumed by the static site templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    pub generated_at: DateTime<Utc>,
    pub total_articles: usize,
    pub categories: Vec<CategorySummary>,
    pub latest_articles: Vec<ArticleSummary>,
    pub articles_by_category: BTreeMap<Category, Vec<ArticleSummary>>,
    pub feeds: Vec<SourceSummary>,
}

impl SiteData {
    pub fn build(articles: &[Article], sources: &[FeedSource], generated_at: DateTime<Utc>) -> Self {
        let categories = Category::ALL
            .iter()
            .map(|&category| CategorySummary {
                id: category,
                label: category.label(),
                article_count: articles.iter().filter(|a| a.category == category).count(),
            })
            .collect();

        let articles_by_category = Category::ALL
            .iter()
            .map(|&category| {
                let selected = articles
                    .iter()
                    .filter(|a| a.category == category)
                    .take(ARTICLES_PER_CATEGORY)
                    .map(ArticleSummary::from)
                    .collect();
                (category, selected)
            })
            .collect();

        let feeds = sources
            .iter()
            .map(|source| SourceSummary {
                name: source.name.clone(),
                homepage_url: source.homepage_url.clone(),
                feed_url: source.feed_url.clone(),
                category: source.category,
                category_label: source.category.label(),
            })
            .collect();

        Self {
            generated_at,
            total_articles: articles.len(),
            categories,
            latest_articles: articles.iter().take(LATEST_ARTICLES).map(ArticleSummary::from).collect(),
            articles_by_category,
            feeds,
        }
    }
}
