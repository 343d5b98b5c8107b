use security_feed::feed::fetcher::FeedFetcher;
use security_feed::feed::{Category, FeedSource};
use security_feed::Error;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use test_data::*;

/// Integration tests for fetching, normalization and aggregation
/// These tests drive the fetcher against mocked feed servers

fn source(name: &str, url: String, category: Category) -> FeedSource {
    FeedSource {
        name: name.to_string(),
        homepage_url: "https://example.com/".to_string(),
        feed_url: url,
        category,
    }
}

async fn mount_feed(server: &MockServer, route: &str, body: impl Into<String>, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.into())
                .insert_header("content-type", content_type),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_rss_processing() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/intl.xml", INTERNATIONAL_RSS, "application/rss+xml").await;

    let fetcher = FeedFetcher::new().unwrap();
    let src = source("Security Week", format!("{}/intl.xml", mock_server.uri()), Category::International);

    let parsed = fetcher.fetch_feed(&src.feed_url).await.unwrap();
    assert_eq!(parsed.title, "Security Week International");
    assert_eq!(parsed.articles.len(), 3);

    let articles = fetcher.fetch_source(&src).await;
    assert_eq!(articles.len(), 2, "link-less item is dropped");

    let first = &articles[0];
    assert_eq!(first.title, "Critical Ivanti flaw exploited in the wild");
    assert_eq!(first.link, "https://intl.example.com/ivanti-flaw");
    assert!(first.content.contains("CVE-2024-21887"));
    assert!(!first.content.contains("<strong>"));
    assert_eq!(first.source_name, "Security Week");
    assert_eq!(first.category, Category::International);
    assert_eq!(first.published_at.to_rfc3339(), "2024-03-15T10:00:00+00:00");
}

#[tokio::test]
async fn test_rdf_and_atom_sources() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/jpcert.rdf", JPCERT_RDF, "application/rdf+xml").await;
    mount_feed(&mock_server, "/vendor.atom", VENDOR_ATOM, "application/atom+xml").await;

    let fetcher = FeedFetcher::new().unwrap();

    let jp = fetcher
        .fetch_source(&source("JPCERT/CC", format!("{}/jpcert.rdf", mock_server.uri()), Category::Official))
        .await;
    assert_eq!(jp.len(), 2);
    assert_eq!(jp[0].title, "Ivanti Connect Secureの脆弱性に関する注意喚起");
    assert_eq!(jp[0].link, "https://jp.example.com/at/2024/0001.html");

    let vendor = fetcher
        .fetch_source(&source("Vendor", format!("{}/vendor.atom", mock_server.uri()), Category::Vendor))
        .await;
    assert_eq!(vendor.len(), 2);
    assert_eq!(vendor[1].content, "Researchers analysed a new loader & its infrastructure.");
}

#[tokio::test]
async fn test_fetch_all_dedupes_and_sorts() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/intl.xml", INTERNATIONAL_RSS, "application/rss+xml").await;
    mount_feed(&mock_server, "/vendor.atom", VENDOR_ATOM, "application/atom+xml").await;

    let sources = vec![
        source("Security Week", format!("{}/intl.xml", mock_server.uri()), Category::International),
        source("Vendor", format!("{}/vendor.atom", mock_server.uri()), Category::Vendor),
    ];

    let fetcher = FeedFetcher::new().unwrap();
    let articles = fetcher.fetch_all(&sources).await;

    let links: Vec<&str> = articles.iter().map(|a| a.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://intl.example.com/ivanti-flaw",
            "https://shared.example.com/ransomware-hospital",
            "https://vendor.example.com/research/loader",
        ]
    );

    // The shared link keeps the first source's copy.
    assert_eq!(articles[1].source_name, "Security Week");
    assert_eq!(articles[1].category, Category::International);

    for pair in articles.windows(2) {
        assert!(pair[0].published_at >= pair[1].published_at);
    }
}

#[tokio::test]
async fn test_feed_error_handling_and_recovery() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/not-found.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/server-error.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/timeout.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(10))
                .set_body_string(INTERNATIONAL_RSS),
        )
        .mount(&mock_server)
        .await;

    mount_feed(&mock_server, "/malformed.xml", MALFORMED_XML, "application/xml").await;

    let fetcher = FeedFetcher::new().unwrap().with_timeout(Duration::from_secs(1));

    let result = fetcher.fetch_feed(&format!("{}/not-found.xml", mock_server.uri())).await;
    assert!(matches!(result, Err(Error::HttpError(_))));

    let result = fetcher.fetch_feed(&format!("{}/server-error.xml", mock_server.uri())).await;
    assert!(matches!(result, Err(Error::HttpError(_))));

    let result = fetcher.fetch_feed(&format!("{}/timeout.xml", mock_server.uri())).await;
    assert!(matches!(result, Err(Error::Timeout(_))));

    let result = fetcher.fetch_feed(&format!("{}/malformed.xml", mock_server.uri())).await;
    assert!(matches!(result, Err(Error::FeedParse(_))));

    let result = fetcher.fetch_feed("ftp://example.com/feed.xml").await;
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn test_failing_sources_are_isolated() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/intl.xml", INTERNATIONAL_RSS, "application/rss+xml").await;
    mount_feed(&mock_server, "/malformed.xml", MALFORMED_XML, "application/xml").await;

    Mock::given(method("GET"))
        .and(path("/down.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let sources = vec![
        source("Down", format!("{}/down.xml", mock_server.uri()), Category::Media),
        source("Security Week", format!("{}/intl.xml", mock_server.uri()), Category::International),
        source("Broken", format!("{}/malformed.xml", mock_server.uri()), Category::Community),
    ];

    let fetcher = FeedFetcher::new().unwrap();
    let articles = fetcher.fetch_all(&sources).await;

    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.source_name == "Security Week"));
}

#[tokio::test]
async fn test_per_source_item_cap() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/big.xml", rss_with_items("big", 35), "application/rss+xml").await;

    let fetcher = FeedFetcher::new().unwrap();
    let src = source("Big", format!("{}/big.xml", mock_server.uri()), Category::Community);
    let articles = fetcher.fetch_source(&src).await;

    assert_eq!(articles.len(), 20);
    assert_eq!(articles[0].link, "https://big.example.com/items/0");
    assert_eq!(articles[19].link, "https://big.example.com/items/19");

    let fetcher = fetcher.with_max_items(5);
    assert_eq!(fetcher.fetch_source(&src).await.len(), 5);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua.xml"))
        .and(header("User-Agent", "CustomAgent/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INTERNATIONAL_RSS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = FeedFetcher::new().unwrap().with_user_agent("CustomAgent/2.0".to_string());
    let parsed = fetcher.fetch_feed(&format!("{}/ua.xml", mock_server.uri())).await.unwrap();
    assert_eq!(parsed.articles.len(), 3);
}
