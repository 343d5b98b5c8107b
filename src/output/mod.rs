//! Publishing: syndication feeds, paging datasets and site data.

pub mod feed;
pub mod site;
pub mod writer;

pub use feed::{generate_all_feed, generate_category_feed, generate_feed, FeedDocument, FeedItem, GeneratedFeed};
pub use site::{paging_entries, PagingEntry, SiteData};
pub use writer::SiteWriter;

/// Generator name written into every feed.
pub const GENERATOR: &str = "SecurityRSSFeed";

/// Longest item description, in characters, before truncation.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Articles in the combined feed.
pub const ALL_FEED_LIMIT: usize = 100;

/// Articles in each per-category feed.
pub const CATEGORY_FEED_LIMIT: usize = 50;

/// Replace `& < > " '` with entities.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Cut `text` to at most `max_chars` characters, ending in `...` when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
