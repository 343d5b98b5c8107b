use crate::error::{Error, Result};
use crate::feed::{ParsedArticle, ParsedFeed};
use feed_rs::model::{FeedType, Link};
use feed_rs::parser as feed_parser;
use html2text::render::text_renderer::TrivialDecorator;
use std::io::BufRead;

/// Wide enough that html2text never wraps a feed summary.
const SNIPPET_RENDER_WIDTH: usize = 10_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse RSS 2.0, RDF/RSS 1.0 or Atom. Entries are kept in delivered order.
    pub fn parse_feed<R: BufRead>(&self, reader: R) -> Result<ParsedFeed> {
        let feed = feed_parser::parse(reader)
            .map_err(|e| Error::FeedParse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content).unwrap_or_else(|| "Untitled Feed".to_string());
        let description = feed.description.map(|d| d.content);
        let link = feed.links.first().map(|l| l.href.clone());
        let last_build_date = feed.updated.or(feed.published);
        // RSS entries inherit the channel's lastBuildDate as `updated`
        let is_atom = feed.feed_type == FeedType::Atom;

        let articles = feed
            .entries
            .into_iter()
            .map(|entry| {
                let title = entry.title.map(|t| t.content);
                let link = entry_link(&entry.links);
                let body = entry.content.and_then(|c| c.body);
                let content = entry.summary.map(|s| s.content).or(body);
                let snippet = content.as_deref().map(html_to_snippet);
                let published = if is_atom {
                    entry.published.or(entry.updated)
                } else {
                    entry.published
                };

                ParsedArticle {
                    title,
                    link,
                    snippet,
                    content,
                    published,
                }
            })
            .collect();

        Ok(ParsedFeed {
            title,
            description,
            link,
            last_build_date,
            articles,
        })
    }

    pub fn validate_feed_url(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(Error::InvalidUrl("URL cannot be empty".to_string()));
        }

        let parsed_url = url::Url::parse(url)
            .map_err(|e| Error::InvalidUrl(format!("Invalid URL: {}", e)))?;

        match parsed_url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(Error::InvalidUrl(format!("Unsupported scheme: {}", scheme))),
        }
    }
}

/// The entry's permalink: `rel="alternate"` or no rel, else the first link.
fn entry_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

/// Plain-text excerpt of an HTML fragment with whitespace collapsed.
pub fn html_to_snippet(html: &str) -> String {
    let text = html2text::from_read_with_decorator(html.as_bytes(), SNIPPET_RENDER_WIDTH, TrivialDecorator::new());
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test RSS Feed</title>
        <description>A test RSS feed for unit testing</description>
        <link>https://example.com</link>
        <lastBuildDate>Wed, 15 Mar 2024 10:00:00 GMT</lastBuildDate>
        <item>
            <title>First Article</title>
            <link>https://example.com/first</link>
            <description>This is the first test article</description>
            <pubDate>Wed, 15 Mar 2024 09:00:00 GMT</pubDate>
            <guid>https://example.com/first</guid>
        </item>
        <item>
            <title>Second Article</title>
            <link>https://example.com/second</link>
            <description><![CDATA[<p>Second <strong>article</strong> body</p>]]></description>
        </item>
    </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Test Atom Feed</title>
    <subtitle>A test Atom feed for unit testing</subtitle>
    <link href="https://example.com"/>
    <updated>2024-03-15T10:00:00Z</updated>
    <id>https://example.com/feed</id>
    <entry>
        <title>Atom Article One</title>
        <link href="https://example.com/atom1"/>
        <id>https://example.com/atom1</id>
        <updated>2024-03-15T09:30:00Z</updated>
        <content type="html">&lt;p&gt;Full content of the first atom article&lt;/p&gt;</content>
    </entry>
</feed>"#;

    const RDF_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns="http://purl.org/rss/1.0/"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
    <channel rdf:about="https://www.jpcert.or.jp/">
        <title>JPCERT/CC</title>
        <link>https://www.jpcert.or.jp/</link>
        <description>注意喚起</description>
    </channel>
    <item rdf:about="https://www.jpcert.or.jp/at/2024/at240001.html">
        <title>Ivanti製品の脆弱性に関する注意喚起</title>
        <link>https://www.jpcert.or.jp/at/2024/at240001.html</link>
        <description>Ivanti製品に脆弱性があります。</description>
        <dc:date>2024-01-11T11:00:00+09:00</dc:date>
    </item>
</rdf:RDF>"#;

    const MALFORMED_XML: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <title>Broken Feed</title>
        <item>
            <title>Unclosed tag
            <link>https://example.com/broken</link>
        </item>
    </channel>
    <!-- Missing closing rss tag -->"#;

    #[test]
    fn test_parse_rss_feed() {
        let parser = FeedParser::new();
        let result = parser.parse_feed(Cursor::new(RSS_SAMPLE.as_bytes())).unwrap();

        assert_eq!(result.title, "Test RSS Feed");
        assert_eq!(result.description, Some("A test RSS feed for unit testing".to_string()));
        assert_eq!(result.articles.len(), 2);

        let first = &result.articles[0];
        assert_eq!(first.title.as_deref(), Some("First Article"));
        assert_eq!(first.link.as_deref(), Some("https://example.com/first"));
        assert_eq!(first.snippet.as_deref(), Some("This is the first test article"));
        assert!(first.published.is_some());

        let second = &result.articles[1];
        assert!(second.published.is_none());
        assert_eq!(second.snippet.as_deref(), Some("Second article body"));
        assert!(second.content.as_ref().unwrap().contains("<strong>"));
    }

    #[test]
    fn test_parse_atom_feed_uses_content_and_updated() {
        let parser = FeedParser::new();
        let result = parser.parse_feed(Cursor::new(ATOM_SAMPLE.as_bytes())).unwrap();

        assert_eq!(result.title, "Test Atom Feed");
        assert_eq!(result.articles.len(), 1);

        let article = &result.articles[0];
        assert_eq!(article.link.as_deref(), Some("https://example.com/atom1"));
        assert_eq!(article.content.as_deref(), Some("<p>Full content of the first atom article</p>"));
        assert_eq!(article.snippet.as_deref(), Some("Full content of the first atom article"));
        assert_eq!(
            article.published.map(|d| d.to_rfc3339()),
            Some("2024-03-15T09:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_parse_rdf_feed() {
        let parser = FeedParser::new();
        let result = parser.parse_feed(Cursor::new(RDF_SAMPLE.as_bytes())).unwrap();

        assert_eq!(result.title, "JPCERT/CC");
        assert_eq!(result.articles.len(), 1);
        assert_eq!(result.articles[0].title.as_deref(), Some("Ivanti製品の脆弱性に関する注意喚起"));
        assert_eq!(
            result.articles[0].link.as_deref(),
            Some("https://www.jpcert.or.jp/at/2024/at240001.html")
        );
    }

    #[test]
    fn test_rss_item_without_pub_date_ignores_channel_dates() {
        let parser = FeedParser::new();
        let undated = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <title>Undated</title>
        <link>https://example.com</link>
        <description>Channel with a build date</description>
        <lastBuildDate>Wed, 15 Mar 2023 10:00:00 GMT</lastBuildDate>
        <pubDate>Wed, 15 Mar 2023 09:00:00 GMT</pubDate>
        <item>
            <title>No date on this item</title>
            <link>https://example.com/undated</link>
        </item>
    </channel>
</rss>"#;

        let result = parser.parse_feed(Cursor::new(undated.as_bytes())).unwrap();
        assert!(result.last_build_date.is_some());
        assert_eq!(result.articles.len(), 1);
        assert!(result.articles[0].published.is_none());
    }

    #[test]
    fn test_atom_entry_prefers_alternate_link() {
        let parser = FeedParser::new();
        let blogger = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Example Blog</title>
    <id>tag:blog.example.com,1999:blog-1</id>
    <updated>2024-03-15T10:00:00Z</updated>
    <entry>
        <id>tag:blog.example.com,1999:blog-1.post-1</id>
        <published>2024-03-14T08:00:00Z</published>
        <updated>2024-03-15T10:00:00Z</updated>
        <title>Patch Tuesday roundup</title>
        <link rel="replies" type="application/atom+xml" href="https://blog.example.com/feeds/1/comments/default"/>
        <link rel="edit" type="application/atom+xml" href="https://www.example.com/feeds/1/posts/default/1"/>
        <link rel="alternate" type="text/html" href="https://blog.example.com/2024/03/post.html"/>
    </entry>
    <entry>
        <id>tag:blog.example.com,1999:blog-1.post-2</id>
        <updated>2024-03-13T10:00:00Z</updated>
        <title>Only a replies link</title>
        <link rel="replies" href="https://blog.example.com/feeds/2/comments/default"/>
    </entry>
</feed>"#;

        let result = parser.parse_feed(Cursor::new(blogger.as_bytes())).unwrap();
        assert_eq!(result.articles.len(), 2);

        let first = &result.articles[0];
        assert_eq!(first.link.as_deref(), Some("https://blog.example.com/2024/03/post.html"));
        assert_eq!(
            first.published.map(|d| d.to_rfc3339()),
            Some("2024-03-14T08:00:00+00:00".to_string())
        );

        let second = &result.articles[1];
        assert_eq!(second.link.as_deref(), Some("https://blog.example.com/feeds/2/comments/default"));
    }

    #[test]
    fn test_parse_malformed_xml() {
        let parser = FeedParser::new();
        let result = parser.parse_feed(Cursor::new(MALFORMED_XML.as_bytes()));

        if let Err(Error::FeedParse(msg)) = result {
            assert!(msg.contains("Failed to parse feed"));
        } else {
            panic!("Expected FeedParse error");
        }
    }

    #[test]
    fn test_feed_with_missing_titles() {
        let parser = FeedParser::new();
        let no_title_feed = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <item>
            <link>https://example.com/notitle</link>
            <description>Article without title</description>
        </item>
    </channel>
</rss>"#;

        let result = parser.parse_feed(Cursor::new(no_title_feed.as_bytes())).unwrap();
        assert_eq!(result.title, "Untitled Feed");
        assert_eq!(result.articles.len(), 1);
        assert!(result.articles[0].title.is_none());
    }

    #[test]
    fn test_feed_with_html_entities() {
        let parser = FeedParser::new();
        let entities_feed = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <title>Entities</title>
        <item>
            <title>Article with &quot;quotes&quot; &amp; symbols</title>
            <description>&lt;p&gt;Fix for CVE-2024-1234 &amp;amp; more&lt;/p&gt;</description>
            <link>https://example.com/entities</link>
        </item>
    </channel>
</rss>"#;

        let result = parser.parse_feed(Cursor::new(entities_feed.as_bytes())).unwrap();
        assert_eq!(result.articles[0].title.as_deref(), Some(r#"Article with "quotes" & symbols"#));
        assert_eq!(result.articles[0].snippet.as_deref(), Some("Fix for CVE-2024-1234 & more"));
    }

    #[test]
    fn test_html_to_snippet_collapses_whitespace() {
        let snippet = html_to_snippet("<div>\n  <p>Line one</p>\n\n<p>Line   two</p></div>");
        assert_eq!(snippet, "Line one Line two");
        assert_eq!(html_to_snippet(""), "");
    }

    #[test]
    fn test_validate_feed_url_valid() {
        let parser = FeedParser::new();

        assert!(parser.validate_feed_url("https://example.com/feed.xml").is_ok());
        assert!(parser.validate_feed_url("http://example.com/rss").is_ok());
        assert!(parser.validate_feed_url("https://b.hatena.ne.jp/search/text?q=x&mode=rss").is_ok());
    }

    #[test]
    fn test_validate_feed_url_invalid() {
        let parser = FeedParser::new();

        assert!(parser.validate_feed_url("not-a-url").is_err());
        assert!(parser.validate_feed_url("ftp://example.com/feed").is_err());
        assert!(parser.validate_feed_url("file:///local/feed.xml").is_err());
        assert!(parser.validate_feed_url("").is_err());
        assert!(parser.validate_feed_url("javascript:alert('xss')").is_err());
    }
}
