// src/refresh.rs
//! Background cache warming. Re-runs the combined aggregation for a set of
//! (category, language) pairs on an interval so interactive requests mostly
//! hit a warm cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::aggregate::NewsAggregator;

#[derive(Clone, Debug)]
pub struct RefreshCfg {
    pub interval: Duration,
    /// (category, language) pairs to keep warm.
    pub targets: Vec<(String, String)>,
}

impl Default for RefreshCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30 * 60),
            targets: vec![("general".to_string(), "en".to_string())],
        }
    }
}

/// Spawn the warming loop. Each tick rebuilds any target whose cache entry
/// has expired; failures only surface as that tick's dataset being smaller.
pub fn spawn_cache_refresh(aggregator: Arc<NewsAggregator>, cfg: RefreshCfg) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cfg.interval);
        // First tick fires immediately and warms the cache at boot.
        loop {
            ticker.tick().await;
            for (category, language) in &cfg.targets {
                let articles = aggregator
                    .get_combined_news(category, language, 1, 0)
                    .await;
                tracing::info!(
                    target: "refresh",
                    category = %category,
                    language = %language,
                    articles = articles.len(),
                    "cache warm tick"
                );
            }
        }
    })
}
