// tests/aggregate_cache.rs
//
// Combined-cache behavior through the public surface: repeat requests within
// the TTL reuse the cached dataset, an expired entry triggers a refetch, and
// clear_cache forces a rebuild.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use worldnews_aggregator::aggregate::NewsAggregator;
use worldnews_aggregator::config::{AggregatorConfig, FeedCatalog, FeedDescriptor};
use worldnews_aggregator::providers::ProviderRegistry;
use worldnews_aggregator::relay::{FetchError, Relay, StaticRelay};

const FEED_URL: &str = "https://feeds.test/counted";

const FEED_XML: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Counted</title>
<item><title>Only story</title><link>https://counted.example.com/1</link>
<pubDate>Tue, 10 Jun 2025 12:00:00 +0000</pubDate></item>
</channel></rss>"#;

/// Delegates to a StaticRelay while counting fetches.
struct CountingRelay {
    inner: StaticRelay,
    calls: AtomicUsize,
}

impl CountingRelay {
    fn new() -> Self {
        Self {
            inner: StaticRelay::new().with(FEED_URL, FEED_XML),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Relay for CountingRelay {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(url).await
    }
}

fn aggregator(relay: Arc<CountingRelay>, combined_ttl: Duration) -> NewsAggregator {
    let mut feeds = HashMap::new();
    feeds.insert(
        "en".to_string(),
        vec![FeedDescriptor {
            name: "Counted".to_string(),
            url: FEED_URL.to_string(),
            category: "general".to_string(),
            latitude: None,
            longitude: None,
        }],
    );
    let cfg = AggregatorConfig {
        combined_ttl,
        ..AggregatorConfig::default()
    };
    NewsAggregator::with_registry(
        relay,
        ProviderRegistry::empty(),
        FeedCatalog::new(feeds),
        cfg,
    )
}

#[tokio::test]
async fn repeat_requests_within_the_ttl_hit_the_cache() {
    let relay = Arc::new(CountingRelay::new());
    let agg = aggregator(Arc::clone(&relay), Duration::from_secs(300));

    let first = agg.get_combined_news("general", "en", 1, 10).await;
    assert_eq!(first.len(), 1);
    assert_eq!(relay.calls(), 1);

    // Different page, same (category, language): served from the cached set.
    let _ = agg.get_combined_news("general", "en", 2, 10).await;
    let again = agg.get_combined_news("general", "en", 1, 10).await;
    assert_eq!(again.len(), 1);
    assert_eq!(relay.calls(), 1);
}

#[tokio::test]
async fn expired_entries_are_rebuilt() {
    let relay = Arc::new(CountingRelay::new());
    let agg = aggregator(Arc::clone(&relay), Duration::from_millis(30));

    let _ = agg.get_combined_news("general", "en", 1, 10).await;
    assert_eq!(relay.calls(), 1);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let refetched = agg.get_combined_news("general", "en", 1, 10).await;
    assert_eq!(refetched.len(), 1);
    assert_eq!(relay.calls(), 2);
}

#[tokio::test]
async fn distinct_category_language_pairs_cache_independently() {
    let relay = Arc::new(CountingRelay::new());
    let agg = aggregator(Arc::clone(&relay), Duration::from_secs(300));

    let _ = agg.get_combined_news("general", "en", 1, 10).await;
    let _ = agg.get_combined_news("business", "en", 1, 10).await;
    assert_eq!(relay.calls(), 2);
}

#[tokio::test]
async fn clear_cache_forces_a_rebuild() {
    let relay = Arc::new(CountingRelay::new());
    let agg = aggregator(Arc::clone(&relay), Duration::from_secs(300));

    let _ = agg.get_combined_news("general", "en", 1, 10).await;
    agg.clear_cache();
    let _ = agg.get_combined_news("general", "en", 1, 10).await;
    assert_eq!(relay.calls(), 2);
}
