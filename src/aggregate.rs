// src/aggregate.rs
//! Aggregator: fans out to REST providers and RSS/Atom feeds, merges the
//! partial successes, deduplicates, sorts newest-first, and owns both cache
//! tiers. No fetch/parse error escapes this module; a failed source simply
//! contributes zero articles.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::article::Article;
use crate::cache::TtlCache;
use crate::config::{AggregatorConfig, FeedCatalog};
use crate::dedup::dedupe;
use crate::feed;
use crate::normalize;
use crate::providers::{ProviderRegistry, ProviderSpec, RequestParams};
use crate::relay::Relay;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "aggregate_articles_total",
            "Articles in rebuilt combined datasets."
        );
        describe_counter!(
            "aggregate_source_errors_total",
            "Provider/feed fetch, parse, or decode errors."
        );
        describe_counter!(
            "aggregate_dedup_total",
            "Articles removed as cross-source duplicates."
        );
        describe_counter!("aggregate_cache_hits_total", "Combined-cache hits.");
        describe_counter!("aggregate_cache_misses_total", "Combined-cache misses.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "aggregate_last_run_ts",
            "Unix ts when a combined dataset was last rebuilt."
        );
    });
}

/// Explicitly constructed service object; each instance owns its own caches,
/// so tests get fresh state by building a new one.
pub struct NewsAggregator {
    relay: Arc<dyn Relay>,
    registry: ProviderRegistry,
    catalog: FeedCatalog,
    cfg: AggregatorConfig,
    combined_cache: TtlCache<Arc<Vec<Article>>>,
    source_cache: TtlCache<Arc<Vec<Article>>>,
}

impl NewsAggregator {
    pub fn new(relay: Arc<dyn Relay>, catalog: FeedCatalog, cfg: AggregatorConfig) -> Self {
        Self::with_registry(relay, ProviderRegistry::with_builtin(), catalog, cfg)
    }

    pub fn with_registry(
        relay: Arc<dyn Relay>,
        registry: ProviderRegistry,
        catalog: FeedCatalog,
        cfg: AggregatorConfig,
    ) -> Self {
        ensure_metrics_described();
        let combined_cache = TtlCache::new(cfg.combined_ttl, cfg.combined_max_entries);
        let source_cache = TtlCache::new(cfg.source_ttl, cfg.source_max_entries);
        Self {
            relay,
            registry,
            catalog,
            cfg,
            combined_cache,
            source_cache,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.cfg
    }

    pub fn relay(&self) -> &Arc<dyn Relay> {
        &self.relay
    }

    pub fn catalog(&self) -> &FeedCatalog {
        &self.catalog
    }

    /// The combined, deduplicated, newest-first dataset for
    /// (category, language), sliced for pagination. The full dataset is
    /// cached as a unit; pagination within the freshness window never
    /// refetches.
    pub async fn get_combined_news(
        &self,
        category: &str,
        language: &str,
        page: u32,
        page_size: usize,
    ) -> Vec<Article> {
        let category = &crate::category::canonical(category);
        let key = format!("combined:{category}:{language}");
        if let Some(set) = self.combined_cache.get(&key) {
            counter!("aggregate_cache_hits_total").increment(1);
            return self.paginate(&set, page, page_size);
        }
        counter!("aggregate_cache_misses_total").increment(1);

        let mut merged: Vec<Article> = Vec::new();

        // REST providers answer English only; other languages rely on
        // curated feeds to avoid mixing languages within one result set.
        if language == "en" {
            merged.extend(self.fetch_provider_burst(category, language).await);
        } else {
            tracing::debug!(language, "skipping REST providers for non-English request");
        }

        merged.extend(
            feed::fetch_language_feeds(self.relay.as_ref(), &self.catalog, language, category)
                .await,
        );

        let before = merged.len();
        let mut unique = dedupe(merged);
        counter!("aggregate_dedup_total").increment((before - unique.len()) as u64);
        unique.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        counter!("aggregate_articles_total").increment(unique.len() as u64);
        gauge!("aggregate_last_run_ts").set(Utc::now().timestamp().max(0) as f64);
        tracing::info!(
            category,
            language,
            total = unique.len(),
            "combined dataset rebuilt"
        );

        let set = Arc::new(unique);
        self.combined_cache.insert(&key, Arc::clone(&set));
        self.paginate(&set, page, page_size)
    }

    /// Search REST providers only (feeds have no search endpoint),
    /// first-success-wins in registry order rather than fan-out-merge.
    pub async fn search_news(
        &self,
        query: &str,
        language: &str,
        page: u32,
        page_size: usize,
    ) -> Vec<Article> {
        let cache_key = format!("search:{query}:{language}:{page}");
        if let Some(cached) = self.source_cache.get(&cache_key) {
            counter!("aggregate_cache_hits_total").increment(1);
            return (*cached).clone();
        }

        let page_size = if page_size == 0 {
            self.cfg.default_page_size
        } else {
            page_size
        } as u32;

        for spec in self.registry.providers() {
            let Some(search_url) = spec.search_url else {
                continue;
            };
            let Some(api_key) = spec.api_key() else {
                continue;
            };
            let params = RequestParams {
                key: &api_key,
                category: "all",
                language,
                query: Some(query),
                page,
                page_size,
            };
            let articles = self.fetch_and_decode(spec, &search_url(&params)).await;
            if !articles.is_empty() {
                self.source_cache
                    .insert(&cache_key, Arc::new(articles.clone()));
                return articles;
            }
        }
        Vec::new()
    }

    /// Drop both cache tiers.
    pub fn clear_cache(&self) {
        self.combined_cache.clear();
        self.source_cache.clear();
    }

    /// Concurrent one-page burst from every configured provider. Each call
    /// is isolated; failures degrade that provider to an empty list.
    async fn fetch_provider_burst(&self, category: &str, language: &str) -> Vec<Article> {
        let fetches = self
            .registry
            .providers()
            .iter()
            .map(|spec| self.fetch_provider_headlines(spec, category, language));
        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn fetch_provider_headlines(
        &self,
        spec: &ProviderSpec,
        category: &str,
        language: &str,
    ) -> Vec<Article> {
        let Some(api_key) = spec.api_key() else {
            tracing::debug!(provider = spec.id, "no API key configured, skipping");
            return Vec::new();
        };

        let cache_key = format!("{}:{category}:{language}", spec.id);
        if let Some(cached) = self.source_cache.get(&cache_key) {
            return (*cached).clone();
        }

        let params = RequestParams {
            key: &api_key,
            category,
            language,
            query: None,
            page: 1,
            page_size: self.cfg.provider_page_size,
        };
        let articles = self
            .fetch_and_decode(spec, &(spec.headlines_url)(&params))
            .await;
        if !articles.is_empty() {
            self.source_cache
                .insert(&cache_key, Arc::new(articles.clone()));
        }
        articles
    }

    async fn fetch_and_decode(&self, spec: &ProviderSpec, url: &str) -> Vec<Article> {
        let body = match self.relay.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, provider = spec.id, "provider fetch failed");
                counter!("aggregate_source_errors_total").increment(1);
                return Vec::new();
            }
        };
        match (spec.decode)(&body) {
            Ok(records) => normalize::normalize(records, Utc::now()),
            Err(e) => {
                tracing::warn!(error = %e, provider = spec.id, "provider decode failed");
                counter!("aggregate_source_errors_total").increment(1);
                Vec::new()
            }
        }
    }

    /// Two-tier pagination: page 1 returns up to the configured ceiling to
    /// front-load content; later pages are `page_size`-wide slices starting
    /// at the ceiling.
    fn paginate(&self, set: &[Article], page: u32, page_size: usize) -> Vec<Article> {
        let ceiling = self.cfg.first_page_ceiling;
        let page_size = if page_size == 0 {
            self.cfg.default_page_size
        } else {
            page_size
        };
        if page <= 1 {
            return set[..set.len().min(ceiling)].to_vec();
        }
        // page and page_size are caller-supplied; saturate instead of
        // overflowing on absurd values.
        let start = ceiling.saturating_add((page as usize - 2).saturating_mul(page_size));
        if start >= set.len() {
            return Vec::new();
        }
        let end = start.saturating_add(page_size).min(set.len());
        set[start..end].to_vec()
    }
}
