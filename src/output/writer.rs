use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::config::SiteSettings;
use crate::error::{Error, Result};
use crate::feed::{Article, Category, FeedSource};
use crate::output::feed::{generate_all_feed, generate_category_feed, GeneratedFeed};
use crate::output::site::{paging_entries, SiteData};

/// Lays out the published artifacts under one output directory:
///
/// ```text
/// feeds/{all,<category>}.{xml,atom,json}
/// data/articles-{all,<category>}.json
/// _data/feed.json
/// ```
#[derive(Debug, Clone)]
pub struct SiteWriter {
    root: PathBuf,
}

impl SiteWriter {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every artifact for `articles`. Returns the written paths.
    pub async fn publish(
        &self,
        articles: &[Article],
        sources: &[FeedSource],
        site: &SiteSettings,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let all = generate_all_feed(articles, site)?;
        written.extend(self.write_feed("all", &all).await?);
        for category in Category::ALL {
            let feed = generate_category_feed(articles, category, site)?;
            written.extend(self.write_feed(category.as_str(), &feed).await?);
        }

        let entries = paging_entries(articles);
        written.push(self.write_json("data/articles-all.json", &entries, false).await?);
        for category in Category::ALL {
            let selected: Vec<_> = entries.iter().filter(|e| e.category == category).collect();
            let path = format!("data/articles-{}.json", category.as_str());
            written.push(self.write_json(&path, &selected, false).await?);
        }

        let site_data = SiteData::build(articles, sources, Utc::now());
        written.push(self.write_json("_data/feed.json", &site_data, true).await?);

        info!("Wrote {} files to {}", written.len(), self.root.display());
        Ok(written)
    }

    async fn write_feed(&self, feed_id: &str, feed: &GeneratedFeed) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(3);
        for (extension, body) in [("xml", &feed.rss), ("atom", &feed.atom), ("json", &feed.json)] {
            let path = format!("feeds/{}.{}", feed_id, extension);
            paths.push(self.write_file(&path, body).await?);
        }
        Ok(paths)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, relative: &str, value: &T, pretty: bool) -> Result<PathBuf> {
        let body = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        self.write_file(relative, &body).await
    }

    async fn write_file(&self, relative: &str, body: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory '{}': {}", dir.display(), e),
                ))
            })?;
        }

        fs::write(&path, body).await?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn article(link: &str, category: Category) -> Article {
        Article {
            title: "Advisory".to_string(),
            link: link.to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            content: "Details".to_string(),
            source_name: "CISA".to_string(),
            category,
        }
    }

    #[tokio::test]
    async fn test_publish_layout() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SiteWriter::new(temp_dir.path().join("site"));

        let articles = vec![
            article("https://example.com/1", Category::International),
            article("https://example.com/2", Category::Official),
        ];
        let written = writer.publish(&articles, &[], &SiteSettings::default()).await.unwrap();

        // 6 feeds x 3 formats, 6 paging files, 1 site data file.
        assert_eq!(written.len(), 25);

        let root = writer.root();
        for id in ["all", "official", "vendor", "community", "international", "media"] {
            assert!(root.join(format!("feeds/{}.xml", id)).exists());
            assert!(root.join(format!("feeds/{}.atom", id)).exists());
            assert!(root.join(format!("feeds/{}.json", id)).exists());
            assert!(root.join(format!("data/articles-{}.json", id)).exists());
        }

        let official = std::fs::read_to_string(root.join("data/articles-official.json")).unwrap();
        let official: Vec<serde_json::Value> = serde_json::from_str(&official).unwrap();
        assert_eq!(official.len(), 1);
        assert_eq!(official[0]["link"], "https://example.com/2");

        let site = std::fs::read_to_string(root.join("_data/feed.json")).unwrap();
        let site: serde_json::Value = serde_json::from_str(&site).unwrap();
        assert_eq!(site["totalArticles"], 2);
    }

    #[tokio::test]
    async fn test_unwritable_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let writer = SiteWriter::new(blocker.join("site"));
        let result = writer.publish(&[], &[], &SiteSettings::default()).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
