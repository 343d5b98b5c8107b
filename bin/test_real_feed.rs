use security_feed::feed::fetcher::FeedFetcher;
use security_feed::feed::{Category, FeedSource};
use security_feed::translation::is_translation_candidate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://krebsonsecurity.com/feed/".to_string());
    println!("Testing feed module with real URL: {}", url);

    let fetcher = FeedFetcher::new()?;

    match fetcher.fetch_feed(&url).await {
        Ok(parsed_feed) => {
            println!("✓ Feed fetched and parsed successfully!");
            println!("Title: {}", parsed_feed.title);
            if let Some(description) = &parsed_feed.description {
                println!("Description: {}", description);
            }
            if let Some(link) = &parsed_feed.link {
                println!("Link: {}", link);
            }
            if let Some(updated) = &parsed_feed.last_build_date {
                println!("Last updated: {}", updated);
            }
            println!("Number of entries: {}", parsed_feed.articles.len());
        }
        Err(e) => {
            println!("✗ Failed to fetch feed: {}", e);
            return Err(e.into());
        }
    }

    let source = FeedSource {
        name: "smoke-test".to_string(),
        homepage_url: url.clone(),
        feed_url: url,
        category: Category::International,
    };

    // Same path the pipeline takes: item cap, defaults, link filter.
    let articles = fetcher.fetch_source(&source).await;
    println!("Normalized articles: {}", articles.len());

    for (i, article) in articles.iter().take(3).enumerate() {
        println!("\nArticle {}:", i + 1);
        println!("  Title: {}", article.title);
        println!("  Link: {}", article.link);
        println!("  Published: {}", article.published_at);
        let snippet: String = article.content.chars().take(100).collect();
        println!("  Content: {}", snippet);
        println!(
            "  Translation candidate: {}",
            is_translation_candidate(&article.classification_text())
        );
    }

    Ok(())
}
