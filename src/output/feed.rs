use atom_syndication as atom;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SiteSettings;
use crate::error::{Error, Result};
use crate::feed::{Article, Category};
use crate::output::{
    escape_markup, truncate_text, ALL_FEED_LIMIT, CATEGORY_FEED_LIMIT, GENERATOR, MAX_DESCRIPTION_CHARS,
};

const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1";

/// One feed rendered in every published format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFeed {
    pub rss: String,
    pub atom: String,
    pub json: String,
}

/// Format-neutral feed, rendered to RSS, Atom and JSON Feed.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub language: String,
    pub updated: DateTime<Utc>,
    pub favicon: String,
    pub rss_url: String,
    pub atom_url: String,
    pub json_url: String,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// `[source] title`, entity-escaped.
    pub title: String,
    pub id: String,
    pub link: String,
    /// Truncated, entity-escaped content.
    pub description: String,
    pub date: DateTime<Utc>,
    pub author: String,
}

impl FeedItem {
    pub fn from_article(article: &Article) -> Self {
        let title = format!("[{}] {}", article.source_name, article.title);
        Self {
            title: escape_markup(&title),
            id: article.link.clone(),
            link: article.link.clone(),
            description: escape_markup(&truncate_text(&article.content, MAX_DESCRIPTION_CHARS)),
            date: article.published_at,
            author: article.source_name.clone(),
        }
    }
}

impl FeedDocument {
    pub fn new(articles: &[Article], feed_id: &str, title: &str, description: &str, site: &SiteSettings) -> Self {
        let site_url = site.url.trim_end_matches('/');
        let base = format!("{}/feeds/{}", site_url, feed_id);

        Self {
            id: base.clone(),
            title: title.to_string(),
            description: description.to_string(),
            link: site_url.to_string(),
            language: site.language.clone(),
            updated: articles.first().map(|a| a.published_at).unwrap_or_else(Utc::now),
            favicon: format!("{}/favicon.ico", site_url),
            rss_url: format!("{}.xml", base),
            atom_url: format!("{}.atom", base),
            json_url: format!("{}.json", base),
            items: articles.iter().map(FeedItem::from_article).collect(),
        }
    }

    pub fn to_rss(&self) -> Result<String> {
        let items = self
            .items
            .iter()
            .map(|item| rss::Item {
                title: Some(item.title.clone()),
                link: Some(item.link.clone()),
                description: Some(item.description.clone()),
                author: Some(item.author.clone()),
                guid: Some(rss::Guid {
                    value: item.id.clone(),
                    permalink: true,
                }),
                pub_date: Some(item.date.to_rfc2822()),
                ..Default::default()
            })
            .collect();

        let channel = rss::Channel {
            title: self.title.clone(),
            link: self.link.clone(),
            description: self.description.clone(),
            language: Some(self.language.clone()),
            generator: Some(GENERATOR.to_string()),
            last_build_date: Some(self.updated.to_rfc2822()),
            docs: Some("https://validator.w3.org/feed/docs/rss2.html".to_string()),
            items,
            ..Default::default()
        };

        let bytes = channel
            .write_to(Vec::new())
            .map_err(|e| Error::FeedRender(format!("RSS: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| Error::FeedRender(format!("RSS: {}", e)))
    }

    pub fn to_atom(&self) -> Result<String> {
        let entries = self
            .items
            .iter()
            .map(|item| atom::Entry {
                title: atom::Text::plain(item.title.clone()),
                id: item.id.clone(),
                updated: item.date.into(),
                published: Some(item.date.into()),
                authors: vec![atom::Person {
                    name: item.author.clone(),
                    ..Default::default()
                }],
                links: vec![atom::Link {
                    href: item.link.clone(),
                    ..Default::default()
                }],
                summary: Some(atom::Text::plain(item.description.clone())),
                ..Default::default()
            })
            .collect();

        let feed = atom::Feed {
            title: atom::Text::plain(self.title.clone()),
            id: self.id.clone(),
            updated: self.updated.into(),
            subtitle: Some(atom::Text::plain(self.description.clone())),
            generator: Some(atom::Generator {
                value: GENERATOR.to_string(),
                ..Default::default()
            }),
            icon: Some(self.favicon.clone()),
            links: vec![
                atom::Link {
                    href: self.link.clone(),
                    ..Default::default()
                },
                atom::Link {
                    href: self.atom_url.clone(),
                    rel: "self".to_string(),
                    mime_type: Some("application/atom+xml".to_string()),
                    ..Default::default()
                },
            ],
            lang: Some(self.language.clone()),
            entries,
            ..Default::default()
        };

        let bytes = feed
            .write_to(Vec::new())
            .map_err(|e| Error::FeedRender(format!("Atom: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| Error::FeedRender(format!("Atom: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        let feed = JsonFeed {
            version: JSON_FEED_VERSION,
            title: &self.title,
            home_page_url: &self.link,
            feed_url: &self.json_url,
            description: &self.description,
            favicon: &self.favicon,
            items: self
                .items
                .iter()
                .map(|item| JsonFeedItem {
                    id: &item.id,
                    url: &item.link,
                    title: &item.title,
                    summary: &item.description,
                    content_html: &item.description,
                    date_published: item.date.to_rfc3339(),
                    date_modified: item.date.to_rfc3339(),
                    author: JsonFeedAuthor { name: &item.author },
                })
                .collect(),
        };

        Ok(serde_json::to_string_pretty(&feed)?)
    }

    pub fn render(&self) -> Result<GeneratedFeed> {
        Ok(GeneratedFeed {
            rss: self.to_rss()?,
            atom: self.to_atom()?,
            json: self.to_json()?,
        })
    }
}

#[derive(Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: &'a str,
    feed_url: &'a str,
    description: &'a str,
    favicon: &'a str,
    items: Vec<JsonFeedItem<'a>>,
}

#[derive(Serialize)]
struct JsonFeedItem<'a> {
    id: &'a str,
    url: &'a str,
    title: &'a str,
    summary: &'a str,
    content_html: &'a str,
    date_published: String,
    date_modified: String,
    author: JsonFeedAuthor<'a>,
}

#[derive(Serialize)]
struct JsonFeedAuthor<'a> {
    name: &'a str,
}

/// Render `articles` as-is, in their given order.
pub fn generate_feed(
    articles: &[Article],
    feed_id: &str,
    title: &str,
    description: &str,
    site: &SiteSettings,
) -> Result<GeneratedFeed> {
    FeedDocument::new(articles, feed_id, title, description, site).render()
}

/// Combined feed over the first 100 articles.
pub fn generate_all_feed(articles: &[Article], site: &SiteSettings) -> Result<GeneratedFeed> {
    let limit = articles.len().min(ALL_FEED_LIMIT);
    generate_feed(
        &articles[..limit],
        "all",
        &format!("{} - 全体", site.title),
        &format!("{}（全カテゴリ）", site.description),
        site,
    )
}

/// Feed over the first 50 articles of one category.
pub fn generate_category_feed(articles: &[Article], category: Category, site: &SiteSettings) -> Result<GeneratedFeed> {
    let selected: Vec<Article> = articles
        .iter()
        .filter(|a| a.category == category)
        .take(CATEGORY_FEED_LIMIT)
        .cloned()
        .collect();

    let label = category.label();
    generate_feed(
        &selected,
        category.as_str(),
        &format!("{} - {}", site.title, label),
        &format!("{}（{}）", site.description, label),
        site,
    )
}
