// tests/feed_pipeline.rs
//
// Parser -> normalizer pipeline over realistic RSS/Atom fixtures: every
// valid item yields exactly one complete article; feed-level failures and
// linkless items degrade silently.

use std::collections::HashMap;
use std::sync::Arc;

use worldnews_aggregator::config::{FeedCatalog, FeedDescriptor};
use worldnews_aggregator::feed::fetch_language_feeds;
use worldnews_aggregator::placeholder::PLACEHOLDER_SCHEME;
use worldnews_aggregator::relay::StaticRelay;

const BUSINESS_RSS: &str = include_str!("fixtures/business_rss.xml");
const TECH_ATOM: &str = include_str!("fixtures/tech_atom.xml");

fn feed(name: &str, url: &str, category: &str) -> FeedDescriptor {
    FeedDescriptor {
        name: name.to_string(),
        url: url.to_string(),
        category: category.to_string(),
        latitude: None,
        longitude: None,
    }
}

fn catalog() -> FeedCatalog {
    let mut feeds = HashMap::new();
    feeds.insert(
        "en".to_string(),
        vec![
            feed("Business Wire", "https://feeds.test/business", "business"),
            feed("Tech Review", "https://feeds.test/tech", "technology"),
            feed("Broken Feed", "https://feeds.test/broken", "world"),
        ],
    );
    FeedCatalog::new(feeds)
}

fn relay() -> Arc<StaticRelay> {
    // "broken" has no payload registered and answers 404.
    Arc::new(
        StaticRelay::new()
            .with("https://feeds.test/business", BUSINESS_RSS)
            .with("https://feeds.test/tech", TECH_ATOM),
    )
}

#[tokio::test]
async fn every_valid_rss_item_becomes_one_complete_article() {
    let relay = relay();
    let articles = fetch_language_feeds(relay.as_ref(), &catalog(), "en", "business").await;

    // Five items in the fixture, one without a link.
    assert_eq!(articles.len(), 4);
    for a in &articles {
        assert!(!a.id.is_empty());
        assert!(!a.title.is_empty());
        assert!(a.url.starts_with("https://"));
        assert!(
            a.image.starts_with("http") || a.image.starts_with(PLACEHOLDER_SCHEME),
            "unexpected image {:?}",
            a.image
        );
    }
}

#[tokio::test]
async fn image_extraction_respects_priority_and_placeholder_fallback() {
    let relay = relay();
    let articles = fetch_language_feeds(relay.as_ref(), &catalog(), "en", "business").await;
    let by_url: HashMap<_, _> = articles.iter().map(|a| (a.url.as_str(), a)).collect();

    assert_eq!(
        by_url["https://business.example.com/earnings-beat"].image,
        "https://img.example.com/earnings.jpg"
    );
    assert_eq!(
        by_url["https://business.example.com/trade-talks"].image,
        "https://img.example.com/trade-thumb.jpg"
    );
    assert_eq!(
        by_url["https://business.example.com/markets-rally"].image,
        "https://img.example.com/rally.jpg"
    );
    assert!(by_url["https://business.example.com/merger-review"]
        .image
        .starts_with(PLACEHOLDER_SCHEME));
}

#[tokio::test]
async fn articles_carry_channel_source_and_are_sorted_newest_first() {
    let relay = relay();
    let articles = fetch_language_feeds(relay.as_ref(), &catalog(), "en", "business").await;

    assert!(articles.iter().all(|a| a.source == "Example Business Wire"));
    for pair in articles.windows(2) {
        assert!(pair[0].published_at >= pair[1].published_at);
    }
}

#[tokio::test]
async fn atom_feed_parses_with_terms_and_links() {
    let relay = relay();
    let articles = fetch_language_feeds(relay.as_ref(), &catalog(), "en", "technology").await;

    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.category == "technology"));
    assert_eq!(articles[0].url, "https://tech.example.com/accelerator");
    assert_eq!(articles[0].image, "https://img.example.com/chip.jpg");
    assert_eq!(articles[1].image, "https://img.example.com/browser.png");
}

#[tokio::test]
async fn broken_feed_contributes_nothing_without_failing_the_rest() {
    let relay = relay();
    // "general" fans out to all three feeds, including the 404 one.
    let articles = fetch_language_feeds(relay.as_ref(), &catalog(), "en", "general").await;
    assert_eq!(articles.len(), 6);
}
