// src/feed/mod.rs
//! Feed-side fan-out: fetch every configured RSS/Atom feed for a language
//! concurrently, tolerate per-feed failures, and narrow to a category either
//! by feed tags or by the keyword heuristic.

pub mod parse;

use chrono::Utc;
use futures::future::join_all;
use metrics::counter;

use crate::article::Article;
use crate::category;
use crate::config::{FeedCatalog, FeedDescriptor};
use crate::normalize;
use crate::relay::Relay;

/// Fetch and normalize one feed. Any failure (network, upstream, parse)
/// degrades to an empty list; it never aborts sibling feeds.
pub async fn fetch_feed(relay: &dyn Relay, feed: &FeedDescriptor) -> Vec<Article> {
    let body = match relay.fetch(&feed.url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, feed = %feed.name, "feed fetch failed");
            counter!("aggregate_source_errors_total").increment(1);
            return Vec::new();
        }
    };

    let mut records = parse::parse_feed(&body);
    for record in &mut records {
        // The descriptor supplies what the document omitted.
        if record.source.is_none() {
            record.source = Some(feed.name.clone());
        }
        if record.category.is_none() && !feed.category.is_empty() {
            record.category = Some(feed.category.clone());
        }
    }
    normalize::normalize(records, Utc::now())
}

/// Select the feeds to fetch for (language, category). Returns the selection
/// plus whether the caller must fall back to keyword filtering because the
/// language has no feeds tagged with this category.
fn select_feeds<'a>(
    feeds: &'a [FeedDescriptor],
    category: &str,
) -> (Vec<&'a FeedDescriptor>, bool) {
    if category == "all" || category == "general" {
        return (feeds.iter().collect(), false);
    }
    let tagged: Vec<&FeedDescriptor> = feeds.iter().filter(|f| f.category == category).collect();
    if tagged.is_empty() {
        (feeds.iter().collect(), true)
    } else {
        (tagged, false)
    }
}

/// Fan out over every selected feed for the language, merge the partial
/// successes, and return the result sorted newest-first.
pub async fn fetch_language_feeds(
    relay: &dyn Relay,
    catalog: &FeedCatalog,
    language: &str,
    category: &str,
) -> Vec<Article> {
    let feeds = catalog.feeds_for(language);
    let (selected, needs_keyword_filter) = select_feeds(feeds, category);

    tracing::debug!(
        language,
        category,
        feeds = selected.len(),
        keyword_filter = needs_keyword_filter,
        "fetching language feeds"
    );

    let results = join_all(selected.iter().map(|f| fetch_feed(relay, f))).await;
    let mut articles: Vec<Article> = results.into_iter().flatten().collect();

    if needs_keyword_filter {
        articles = category::filter_by_keywords(articles, category);
    }

    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles
}
